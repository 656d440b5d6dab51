//! Client-side inbox state: paged summaries, the selected email, and the
//! read/favorite flags kept in sync with local persistence.
//!
//! All mutation goes through [`Inbox`]'s public operations. State sits behind
//! a single lock that is never held across an await, so concurrent calls on
//! one instance interleave only at network suspension points.

mod mutate;
mod select;
pub mod state;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::email::{EmailFull, EmailSummary, total_pages};
use crate::domain::filter::Filter;
use crate::domain::route::Route;
use crate::error::StoreError;
use crate::mail::gateway::EmailGateway;
use crate::store::cache::{BodyCache, PageCache};
use crate::store::debounce::Debouncer;
use crate::store::kv::{KeyValueStore, PersistKey, load_ids};

pub use state::{FlatList, SelectOutcome, SelectionPhase};
use state::{State, merge_flags};

/// Everything a view needs to draw the inbox, taken in one consistent read.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxView {
    /// Current page after the active filter.
    pub emails: Vec<EmailSummary>,
    /// Size of the current page before filtering.
    pub unfiltered_count: usize,
    pub selected: Option<EmailFull>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    pub filter: Filter,
    /// Pagination controls are only offered on the unfiltered list.
    pub show_pagination: bool,
    pub route: Route,
}

pub struct Inbox {
    gateway: Arc<dyn EmailGateway>,
    kv: Arc<dyn KeyValueStore>,
    persist: Debouncer,
    state: Mutex<State>,
}

impl Inbox {
    pub fn new(
        gateway: Arc<dyn EmailGateway>,
        kv: Arc<dyn KeyValueStore>,
        persist: Debouncer,
    ) -> Self {
        Self::with_caches(gateway, kv, persist, PageCache::default(), BodyCache::default())
    }

    pub fn with_caches(
        gateway: Arc<dyn EmailGateway>,
        kv: Arc<dyn KeyValueStore>,
        persist: Debouncer,
        pages: PageCache,
        bodies: BodyCache,
    ) -> Self {
        Self {
            gateway,
            kv,
            persist,
            state: Mutex::new(State::new(pages, bodies)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Latest known id set for `key`. Anything scheduled this session wins over
    /// what is on disk, whether or not its write went through.
    fn persisted_ids(&self, key: PersistKey) -> HashSet<String> {
        match self.persist.latest(key) {
            Some(ids) => ids.into_iter().collect(),
            None => load_ids(self.kv.as_ref(), key).into_iter().collect(),
        }
    }

    /// Load page `n` into the list, from the page cache when possible.
    ///
    /// Returns `false` when the request is dropped: `n` out of range, or a
    /// page load already in flight. Fetch failures land in the error slot.
    pub async fn load_page(&self, n: u32) -> bool {
        let cached = {
            let mut st = self.state();
            if n < 1 || n > st.total_pages {
                log::debug!("Page {n} out of range (1..={})", st.total_pages);
                return false;
            }
            if st.page_loading {
                log::debug!("Page {n} dropped, another page load is in flight");
                return false;
            }
            st.page_loading = true;
            st.pages.get(n).map(<[EmailSummary]>::to_vec)
        };
        let _loading = PageLoadGuard { inbox: self };

        let (raw, fetched_total) = match cached {
            Some(items) => {
                log::debug!("Page {n} served from cache");
                (items, None)
            }
            None => match self.gateway.fetch_page(n).await {
                Ok(resp) => {
                    log::info!("Fetched page {n} ({} emails, {} total)", resp.list.len(), resp.total);
                    (resp.list, Some(total_pages(resp.total)))
                }
                Err(e) => {
                    log::error!("Fetching page {n} failed: {e}");
                    self.state().error = Some(StoreError::FetchListFailed(e.to_string()));
                    return true;
                }
            },
        };

        let favorites = self.persisted_ids(PersistKey::FavoriteEmails);
        let read = self.persisted_ids(PersistKey::ReadEmails);
        let merged = merge_flags(raw.clone(), &favorites, &read);

        let mut st = self.state();
        if let Some(pages) = fetched_total {
            st.pages.put(n, raw);
            st.total_pages = pages;
        }
        st.list.splice_page(n, merged);
        st.page = n;
        st.error = None;
        true
    }

    pub async fn next_page(&self) -> bool {
        let target = {
            let st = self.state();
            if st.page >= st.total_pages {
                return false;
            }
            st.page + 1
        };
        self.load_page(target).await
    }

    pub async fn prev_page(&self) -> bool {
        let target = {
            let st = self.state();
            if st.page <= 1 {
                return false;
            }
            st.page - 1
        };
        self.load_page(target).await
    }

    /// Load the first page and, when the route names an email, open it.
    ///
    /// The email is not looked up when page 1 failed to load; the list error
    /// stays in the error slot.
    pub async fn open(&self, route: &Route) -> Option<SelectOutcome> {
        self.load_page(1).await;
        let id = route.email_id()?;
        if let Some(err) = self.error() {
            log::warn!("Not opening {id}: {err}");
            return None;
        }
        Some(self.select_email(id).await)
    }

    /// Current page filtered by `kind`. Leaves the active filter untouched.
    pub fn apply_filter(&self, kind: Filter) -> Vec<EmailSummary> {
        let st = self.state();
        st.page_emails().filter(|e| kind.matches(e)).cloned().collect()
    }

    pub fn set_filter(&self, kind: Filter) {
        self.state().filter = kind;
    }

    pub fn filter(&self) -> Filter {
        self.state().filter
    }

    pub fn visible_emails(&self) -> Vec<EmailSummary> {
        let kind = self.filter();
        self.apply_filter(kind)
    }

    pub fn page_emails(&self) -> Vec<EmailSummary> {
        self.state().page_emails().cloned().collect()
    }

    pub fn unfiltered_count(&self) -> usize {
        self.state().page_emails().count()
    }

    pub fn filtered_count(&self) -> usize {
        let st = self.state();
        let kind = st.filter;
        st.page_emails().filter(|e| kind.matches(e)).count()
    }

    pub fn summary(&self, id: &str) -> Option<EmailSummary> {
        self.state().list.find(id).cloned()
    }

    pub fn selected(&self) -> Option<EmailFull> {
        self.state().selected.clone()
    }

    pub fn cached_body(&self, id: &str) -> Option<EmailFull> {
        self.state().bodies.get(id).cloned()
    }

    pub fn is_cached_page(&self, page: u32) -> bool {
        self.state().pages.contains(page)
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn error(&self) -> Option<StoreError> {
        self.state().error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state().error.as_ref().map(ToString::to_string)
    }

    pub fn page(&self) -> u32 {
        self.state().page
    }

    pub fn total_pages(&self) -> u32 {
        self.state().total_pages
    }

    pub fn route(&self) -> Route {
        self.state().route.clone()
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.state().selection.phase.clone()
    }

    pub fn snapshot(&self) -> InboxView {
        let st = self.state();
        let filter = st.filter;
        InboxView {
            emails: st.page_emails().filter(|e| filter.matches(e)).cloned().collect(),
            unfiltered_count: st.page_emails().count(),
            selected: st.selected.clone(),
            loading: st.is_loading(),
            error: st.error.as_ref().map(ToString::to_string),
            page: st.page,
            total_pages: st.total_pages,
            filter,
            show_pagination: filter == Filter::All,
            route: st.route.clone(),
        }
    }

    /// Write pending persistence immediately, e.g. before exit.
    pub fn flush(&self) {
        self.persist.flush();
    }
}

/// Clears the in-flight page flag however the load ends, including when the
/// load future is dropped mid-fetch.
struct PageLoadGuard<'a> {
    inbox: &'a Inbox,
}

impl Drop for PageLoadGuard<'_> {
    fn drop(&mut self) {
        self.inbox.state().page_loading = false;
    }
}
