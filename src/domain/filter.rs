use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::email::EmailSummary;

/// View-only predicate over the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Read,
    Unread,
    Favorites,
}

impl Filter {
    pub fn matches(self, email: &EmailSummary) -> bool {
        match self {
            Filter::All => true,
            Filter::Read => email.read,
            Filter::Unread => !email.read,
            Filter::Favorites => email.favorite,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Read => "read",
            Filter::Unread => "unread",
            Filter::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "read" => Ok(Filter::Read),
            "unread" => Ok(Filter::Unread),
            "favorites" | "favourites" => Ok(Filter::Favorites),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}
