//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Follow-up status of an inquiry message.
///
/// Admins move messages through `new → contacted → completed` and may reset a
/// completed message back to `new`. Nothing changes status automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "message_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Just received, nobody has replied yet.
    #[default]
    New,
    /// Someone has reached out to the sender.
    Contacted,
    /// The inquiry is closed.
    Completed,
}

impl MessageStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 3] = [Self::New, Self::Contacted, Self::Completed];

    /// The wire and database spelling of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid status")]
pub struct InvalidStatus(pub String);

impl std::str::FromStr for MessageStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "completed" => Ok(Self::Completed),
            _ => Err(InvalidStatus(s.to_owned())),
        }
    }
}
