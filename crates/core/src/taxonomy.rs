//! Static product taxonomy.
//!
//! Categories and their subcategories are defined in code, not in the
//! database. Products reference them by key, and every write goes through
//! [`ProductTags::new`] so that stored tags always satisfy two rules:
//!
//! 1. every key exists in the taxonomy, and
//! 2. every subcategory belongs to one of the product's own categories.

use serde::Serialize;

/// A second-level tag nested under a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubCategory {
    /// Stable key stored on products.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// A top-level product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Stable key stored on products.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Subcategories that may only be used together with this category.
    pub sub_categories: &'static [SubCategory],
}

impl Category {
    /// Whether `key` is one of this category's subcategories.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.sub_categories.iter().any(|sub| sub.key == key)
    }
}

static CATEGORIES: &[Category] = &[
    Category {
        key: "men-boots",
        label: "Men Boots",
        sub_categories: &[
            SubCategory {
                key: "men-snow-boots",
                label: "Men Snow Boots",
            },
            SubCategory {
                key: "men-hiking-boots",
                label: "Men Hiking Boots",
            },
            SubCategory {
                key: "men-work-boots",
                label: "Men Work Boots",
            },
        ],
    },
    Category {
        key: "women-boots",
        label: "Women Boots",
        sub_categories: &[
            SubCategory {
                key: "women-chelsea-boots",
                label: "Women Chelsea Boots",
            },
            SubCategory {
                key: "women-snow-boots",
                label: "Women Snow Boots",
            },
        ],
    },
    Category {
        key: "tactical-boots",
        label: "Tactical Boots",
        sub_categories: &[],
    },
];

/// All categories in display order.
#[must_use]
pub fn categories() -> &'static [Category] {
    CATEGORIES
}

/// Look up a category by key.
#[must_use]
pub fn category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.key == key)
}

/// Find the category a subcategory key lives under.
#[must_use]
pub fn parent_of(sub_key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.contains(sub_key))
}

/// Reasons a set of tags is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// The category key is not in the taxonomy.
    #[error("Invalid category: {0}")]
    UnknownCategory(String),
    /// The subcategory key is not in the taxonomy.
    #[error("Invalid subcategory: {0}")]
    UnknownSubCategory(String),
    /// The subcategory exists, but under a category the product does not have.
    #[error("Subcategory {0} does not belong to the selected categories")]
    OrphanSubCategory(String),
}

/// Validate a single category key (used for catalog filters).
///
/// # Errors
///
/// Returns [`TaxonomyError::UnknownCategory`] if the key is not defined.
pub fn check_category(key: &str) -> Result<&'static Category, TaxonomyError> {
    category(key).ok_or_else(|| TaxonomyError::UnknownCategory(key.to_owned()))
}

/// Validate a single subcategory key (used for catalog filters).
///
/// # Errors
///
/// Returns [`TaxonomyError::UnknownSubCategory`] if the key is not defined
/// under any category.
pub fn check_sub_category(key: &str) -> Result<&'static Category, TaxonomyError> {
    parent_of(key).ok_or_else(|| TaxonomyError::UnknownSubCategory(key.to_owned()))
}

/// A validated pair of category and subcategory key sets.
///
/// Keys keep the order in which they were first given; repeats are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTags {
    categories: Vec<String>,
    sub_categories: Vec<String>,
}

impl ProductTags {
    /// Validate tags against the taxonomy.
    ///
    /// Unknown categories are reported before unknown subcategories, and
    /// both before orphaned subcategories, each naming the first offending
    /// key in input order.
    ///
    /// ```
    /// use trailforge_core::{ProductTags, TaxonomyError};
    ///
    /// let tags = ProductTags::new(["men-boots"], ["men-snow-boots"]).unwrap();
    /// assert_eq!(tags.sub_categories(), ["men-snow-boots"]);
    ///
    /// assert_eq!(
    ///     ProductTags::new(["women-boots"], ["men-snow-boots"]),
    ///     Err(TaxonomyError::OrphanSubCategory("men-snow-boots".into())),
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the [`TaxonomyError`] for the first key that fails.
    pub fn new<C, S>(categories: C, sub_categories: S) -> Result<Self, TaxonomyError>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let categories = dedup(categories);
        let sub_categories = dedup(sub_categories);

        for key in &categories {
            check_category(key)?;
        }

        for key in &sub_categories {
            check_sub_category(key)?;
        }

        for key in &sub_categories {
            let owned = categories
                .iter()
                .filter_map(|cat| category(cat))
                .any(|cat| cat.contains(key));
            if !owned {
                return Err(TaxonomyError::OrphanSubCategory(key.clone()));
            }
        }

        Ok(Self {
            categories,
            sub_categories,
        })
    }

    /// Category keys.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Subcategory keys.
    #[must_use]
    pub fn sub_categories(&self) -> &[String] {
        &self.sub_categories
    }
}

fn dedup<I>(keys: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for key in keys {
        let key = key.as_ref();
        if !out.iter().any(|existing| existing == key) {
            out.push(key.to_owned());
        }
    }
    out
}
