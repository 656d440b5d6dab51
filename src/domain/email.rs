use serde::{Deserialize, Serialize};

pub type EmailId = String;

/// Server-controlled page size.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    pub email: String,
}

/// Summary of an email for the list view (no body).
///
/// `read` and `favorite` never come from the server; they are merged in from
/// local persistence after a page is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: EmailId,
    #[serde(rename = "from")]
    pub sender: Sender,
    /// Epoch milliseconds.
    pub date: i64,
    pub subject: String,
    pub short_description: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub favorite: bool,
}

/// A summary enriched with its body, as shown in the reading pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailFull {
    pub summary: EmailSummary,
    pub body: String,
}

impl EmailFull {
    pub fn new(summary: EmailSummary, body: impl Into<String>) -> Self {
        Self {
            summary,
            body: body.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

/// Number of pages needed for `total` emails. Never less than one, so the
/// first page is always addressable.
pub fn total_pages(total: u64) -> u32 {
    let pages = total.div_ceil(PAGE_SIZE as u64).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Offset of the first email of `page` in the flattened list.
pub fn page_offset(page: u32) -> usize {
    (page.saturating_sub(1) as usize) * PAGE_SIZE
}
