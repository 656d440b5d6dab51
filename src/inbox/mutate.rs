use super::Inbox;
use super::state::State;
use crate::store::kv::PersistKey;

impl Inbox {
    /// Flip the favorite flag of `id` everywhere it is held and schedule the
    /// favorite set for persistence. Unknown ids are ignored.
    ///
    /// Returns the new flag value.
    pub fn toggle_favorite(&self, id: &str) -> Option<bool> {
        let (favorite, favorite_ids) = {
            let mut guard = self.state();
            let st = &mut *guard;
            let Some(summary) = st.list.find_mut(id) else {
                log::debug!("Ignoring favorite toggle for unknown email {id}");
                return None;
            };
            summary.favorite = !summary.favorite;
            let favorite = summary.favorite;

            st.bodies.update(id, |e| e.summary.favorite = favorite);
            if let Some(selected) = st.selected.as_mut().filter(|s| s.id() == id) {
                selected.summary.favorite = favorite;
            }
            (favorite, st.list.ids_where(|e| e.favorite))
        };

        self.persist.schedule(PersistKey::FavoriteEmails, favorite_ids);
        Some(favorite)
    }

    /// Mark `id` read. Only reached from a successful selection, with the
    /// state lock already held.
    pub(super) fn mark_read(&self, st: &mut State, id: &str) {
        let Some(summary) = st.list.find_mut(id) else {
            return;
        };
        summary.read = true;

        st.bodies.update(id, |e| e.summary.read = true);
        if let Some(selected) = st.selected.as_mut().filter(|s| s.id() == id) {
            selected.summary.read = true;
        }

        let read_ids = st.list.ids_where(|e| e.read);
        self.persist.schedule(PersistKey::ReadEmails, read_ids);
    }
}
