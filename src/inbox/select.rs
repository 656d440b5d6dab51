use std::sync::Arc;

use tokio::sync::Notify;

use super::Inbox;
use super::state::{SelectOutcome, SelectionPhase, State};
use crate::domain::email::EmailFull;
use crate::domain::route::Route;
use crate::error::StoreError;

impl Inbox {
    /// Open email `id`, superseding any selection still being fetched.
    ///
    /// A body cache hit resolves without suspending. Otherwise the body is
    /// fetched and merged with the email's summary. Only the most recent call
    /// ever changes state: an older call still waiting on the network is
    /// abandoned and reports [`SelectOutcome::Cancelled`].
    pub async fn select_email(&self, id: &str) -> SelectOutcome {
        let (generation, abandon, prior) = {
            let mut guard = self.state();
            let st = &mut *guard;
            if let Some(prev) = st.selection.abandon.take() {
                log::debug!("Abandoning in-flight body fetch");
                prev.notify_one();
            }
            st.selection.generation += 1;

            if let Some(full) = st.bodies.get(id).cloned() {
                log::debug!("Body for {id} served from cache");
                self.resolve_selection(st, full);
                return SelectOutcome::Resolved;
            }

            let abandon = Arc::new(Notify::new());
            st.selection.abandon = Some(abandon.clone());
            let prior = std::mem::replace(
                &mut st.selection.phase,
                SelectionPhase::Fetching(id.to_string()),
            );
            let prior = match prior {
                SelectionPhase::Fetching(_) => SelectionPhase::Idle,
                other => other,
            };
            (st.selection.generation, abandon, prior)
        };
        let _fetching = FetchGuard {
            inbox: self,
            generation,
            prior,
        };

        let fetched = tokio::select! {
            biased;
            _ = abandon.notified() => None,
            result = self.gateway.fetch_body(id) => Some(result),
        };

        let mut guard = self.state();
        let st = &mut *guard;
        let Some(result) = fetched.filter(|_| st.selection.generation == generation) else {
            log::debug!("Discarding superseded body fetch for {id}");
            return SelectOutcome::Cancelled;
        };
        st.selection.abandon = None;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Fetching body of {id} failed: {e}");
                st.selection.phase = SelectionPhase::Failed(id.to_string());
                st.error = Some(StoreError::FetchBodyFailed(e.to_string()));
                return SelectOutcome::Failed;
            }
        };
        if resp.id != id {
            log::debug!("Body response for {id} carried id {}", resp.id);
        }

        let Some(summary) = st.list.find(id).cloned() else {
            log::error!("Body for {id} arrived but its summary is not loaded");
            st.selection.phase = SelectionPhase::Failed(id.to_string());
            st.error = Some(StoreError::BodyNotFoundLocally(id.to_string()));
            return SelectOutcome::Failed;
        };

        let full = EmailFull::new(summary, resp.body);
        st.bodies.put(id.to_string(), full.clone());
        self.resolve_selection(st, full);
        SelectOutcome::Resolved
    }

    fn resolve_selection(&self, st: &mut State, full: EmailFull) {
        let id = full.id().to_string();
        st.selected = Some(full);
        st.route = Route::Email(id.clone());
        st.selection.phase = SelectionPhase::Resolved(id.clone());
        st.error = None;
        self.mark_read(st, &id);
    }
}

/// Puts the selection slot back to its previous phase when a fetch is dropped
/// before it completes. Completed and superseded fetches are left alone.
struct FetchGuard<'a> {
    inbox: &'a Inbox,
    generation: u64,
    prior: SelectionPhase,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        let mut st = self.inbox.state();
        let current = st.selection.generation == self.generation;
        if current && matches!(st.selection.phase, SelectionPhase::Fetching(_)) {
            log::debug!("Body fetch dropped before completion");
            st.selection.phase = std::mem::take(&mut self.prior);
            st.selection.abandon = None;
        }
    }
}
