use std::collections::HashMap;

use crate::domain::email::{EmailFull, EmailId, EmailSummary};

/// Pages fetched this session, as the server sent them. No eviction.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<u32, Vec<EmailSummary>>,
}

impl PageCache {
    pub fn get(&self, page: u32) -> Option<&[EmailSummary]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    pub fn put(&mut self, page: u32, summaries: Vec<EmailSummary>) {
        self.pages.insert(page, summaries);
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Fully loaded emails keyed by id. No eviction.
#[derive(Debug, Default)]
pub struct BodyCache {
    bodies: HashMap<EmailId, EmailFull>,
}

impl BodyCache {
    pub fn get(&self, id: &str) -> Option<&EmailFull> {
        self.bodies.get(id)
    }

    pub fn put(&mut self, id: EmailId, email: EmailFull) {
        self.bodies.insert(id, email);
    }

    /// Mutate an entry in place. Absent ids are left absent.
    pub fn update<F>(&mut self, id: &str, mutator: F) -> Option<&EmailFull>
    where
        F: FnOnce(&mut EmailFull),
    {
        let entry = self.bodies.get_mut(id)?;
        mutator(entry);
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
