use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Notify;

use crate::domain::email::{EmailFull, EmailId, EmailSummary, PAGE_SIZE, page_offset};
use crate::domain::filter::Filter;
use crate::domain::route::Route;
use crate::error::StoreError;
use crate::store::cache::{BodyCache, PageCache};

/// Summaries of every page loaded this session, laid out so that the email at
/// position `i` of page `p` sits at `(p - 1) * PAGE_SIZE + i`.
///
/// Slots of pages that were skipped over stay empty.
#[derive(Debug, Default)]
pub struct FlatList {
    slots: Vec<Option<EmailSummary>>,
}

impl FlatList {
    pub fn splice_page(&mut self, page: u32, items: Vec<EmailSummary>) {
        let start = page_offset(page);
        if self.slots.len() < start {
            self.slots.resize(start, None);
        }
        let end = (start + PAGE_SIZE).min(self.slots.len());
        // Emails that moved here from another page since it was loaded leave
        // their old slot, so every id appears once.
        let ids: HashSet<&str> = items.iter().map(|e| e.id.as_str()).collect();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if (start..end).contains(&i) {
                continue;
            }
            if slot.as_ref().is_some_and(|e| ids.contains(e.id.as_str())) {
                *slot = None;
            }
        }
        let mut incoming: Vec<_> = items.into_iter().map(Some).collect();
        // A short page followed by loaded pages keeps their offsets.
        if end < self.slots.len() && incoming.len() < PAGE_SIZE {
            incoming.resize(PAGE_SIZE, None);
        }
        self.slots.splice(start..end, incoming);
    }

    pub fn page(&self, page: u32) -> impl Iterator<Item = &EmailSummary> {
        let start = page_offset(page).min(self.slots.len());
        let end = (start + PAGE_SIZE).min(self.slots.len());
        self.slots[start..end].iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmailSummary> {
        self.slots.iter().flatten()
    }

    pub fn find(&self, id: &str) -> Option<&EmailSummary> {
        self.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut EmailSummary> {
        self.slots.iter_mut().flatten().find(|e| e.id == id)
    }

    pub fn ids_where(&self, pred: impl Fn(&EmailSummary) -> bool) -> Vec<EmailId> {
        self.iter().filter(|e| pred(e)).map(|e| e.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where the selected-email slot is in its fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Fetching(EmailId),
    Resolved(EmailId),
    Failed(EmailId),
}

/// What became of one `select_email` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Resolved,
    /// A newer selection superseded this one; nothing was applied.
    Cancelled,
    Failed,
}

#[derive(Debug, Default)]
pub(crate) struct SelectionSlot {
    pub generation: u64,
    pub abandon: Option<Arc<Notify>>,
    pub phase: SelectionPhase,
}

pub(crate) struct State {
    pub list: FlatList,
    pub page: u32,
    pub total_pages: u32,
    pub filter: Filter,
    pub selected: Option<EmailFull>,
    pub page_loading: bool,
    pub error: Option<StoreError>,
    pub pages: PageCache,
    pub bodies: BodyCache,
    pub selection: SelectionSlot,
    pub route: Route,
}

impl State {
    pub fn new(pages: PageCache, bodies: BodyCache) -> Self {
        Self {
            list: FlatList::default(),
            page: 1,
            total_pages: 1,
            filter: Filter::All,
            selected: None,
            page_loading: false,
            error: None,
            pages,
            bodies,
            selection: SelectionSlot::default(),
            route: Route::Inbox,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.page_loading || matches!(self.selection.phase, SelectionPhase::Fetching(_))
    }

    pub fn page_emails(&self) -> impl Iterator<Item = &EmailSummary> {
        self.list.page(self.page)
    }
}

/// Overlay persisted flags onto summaries as they come from the server or page cache.
pub fn merge_flags(
    items: Vec<EmailSummary>,
    favorites: &HashSet<String>,
    read: &HashSet<String>,
) -> Vec<EmailSummary> {
    items
        .into_iter()
        .map(|mut e| {
            e.favorite = favorites.contains(&e.id);
            e.read = read.contains(&e.id);
            e
        })
        .collect()
}
