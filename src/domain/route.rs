use std::fmt;

use crate::domain::email::EmailId;

/// Location of the client view: the inbox, or one email opened in it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Inbox,
    Email(EmailId),
}

impl Route {
    /// Parse a path such as `/` or `/email/42`. Unknown paths fall back to the inbox.
    pub fn parse(path: &str) -> Self {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next(), segments.next()) {
            (Some("email"), Some(id), None) => Route::Email(id.to_string()),
            _ => Route::Inbox,
        }
    }

    pub fn email_id(&self) -> Option<&str> {
        match self {
            Route::Inbox => None,
            Route::Email(id) => Some(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Inbox => f.write_str("/"),
            Route::Email(id) => write!(f, "/email/{id}"),
        }
    }
}
