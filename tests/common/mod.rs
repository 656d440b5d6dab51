#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rs_inbox::domain::email::{EmailSummary, PAGE_SIZE, Sender};
use rs_inbox::error::GatewayError;
use rs_inbox::inbox::Inbox;
use rs_inbox::mail::gateway::{EmailBodyResponse, EmailGateway, EmailPage};
use rs_inbox::store::debounce::{DEFAULT_WINDOW, Debouncer};
use rs_inbox::store::kv::{KeyValueStore, MemoryKv, PersistKey, load_ids};

/// In-memory mail server with per-call counters, delays and switchable failures.
pub struct FakeGateway {
    emails: Vec<EmailSummary>,
    bodies: HashMap<String, String>,
    page_calls: Mutex<HashMap<u32, usize>>,
    body_calls: Mutex<HashMap<String, usize>>,
    page_delay: Mutex<Duration>,
    body_delays: Mutex<HashMap<String, Duration>>,
    failing_pages: Mutex<HashSet<u32>>,
    failing_bodies: Mutex<HashSet<String>>,
    total_calls: AtomicUsize,
}

impl FakeGateway {
    /// `total` emails with ids `e1..=e{total}`, each with a body.
    pub fn with_emails(total: usize) -> Self {
        let emails: Vec<_> = (1..=total).map(|i| summary(&format!("e{i}"))).collect();
        let bodies = emails
            .iter()
            .map(|e| (e.id.clone(), format!("<p>body of {}</p>", e.id)))
            .collect();
        Self {
            emails,
            bodies,
            page_calls: Mutex::default(),
            body_calls: Mutex::default(),
            page_delay: Mutex::new(Duration::ZERO),
            body_delays: Mutex::default(),
            failing_pages: Mutex::default(),
            failing_bodies: Mutex::default(),
            total_calls: AtomicUsize::new(0),
        }
    }

    /// A body the server knows about for an email that is on no page.
    pub fn with_orphan_body(mut self, id: &str) -> Self {
        self.bodies.insert(id.to_string(), format!("<p>orphan {id}</p>"));
        self
    }

    pub fn set_page_delay(&self, delay: Duration) {
        *self.page_delay.lock().unwrap() = delay;
    }

    pub fn set_body_delay(&self, id: &str, delay: Duration) {
        self.body_delays.lock().unwrap().insert(id.to_string(), delay);
    }

    pub fn set_page_failing(&self, page: u32, failing: bool) {
        let mut pages = self.failing_pages.lock().unwrap();
        if failing {
            pages.insert(page);
        } else {
            pages.remove(&page);
        }
    }

    pub fn set_body_failing(&self, id: &str) {
        self.failing_bodies.lock().unwrap().insert(id.to_string());
    }

    pub fn page_calls(&self, page: u32) -> usize {
        self.page_calls.lock().unwrap().get(&page).copied().unwrap_or(0)
    }

    pub fn body_calls(&self, id: &str) -> usize {
        self.body_calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailGateway for FakeGateway {
    async fn fetch_page(&self, page: u32) -> Result<EmailPage, GatewayError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.page_calls.lock().unwrap().entry(page).or_default() += 1;

        let delay = *self.page_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing_pages.lock().unwrap().contains(&page) {
            return Err(GatewayError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }

        let start = (page as usize - 1) * PAGE_SIZE;
        let list = self
            .emails
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        Ok(EmailPage {
            list,
            total: self.emails.len() as u64,
        })
    }

    async fn fetch_body(&self, id: &str) -> Result<EmailBodyResponse, GatewayError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.body_calls.lock().unwrap().entry(id.to_string()).or_default() += 1;

        let delay = self.body_delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_bodies.lock().unwrap().contains(id) {
            return Err(GatewayError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        match self.bodies.get(id) {
            Some(body) => Ok(EmailBodyResponse {
                id: id.to_string(),
                body: body.clone(),
            }),
            None => Err(GatewayError::Status(reqwest::StatusCode::NOT_FOUND)),
        }
    }
}

pub fn summary(id: &str) -> EmailSummary {
    EmailSummary {
        id: id.to_string(),
        sender: Sender {
            name: format!("sender {id}"),
            email: format!("{id}@example.com"),
        },
        date: 1_582_729_505_000,
        subject: format!("subject {id}"),
        short_description: format!("about {id}"),
        read: false,
        favorite: false,
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub kv: Arc<MemoryKv>,
    pub inbox: Inbox,
}

impl Harness {
    pub fn new(gateway: FakeGateway) -> Self {
        Self::with_kv(gateway, MemoryKv::new())
    }

    pub fn with_kv(gateway: FakeGateway, kv: MemoryKv) -> Self {
        let gateway = Arc::new(gateway);
        let kv = Arc::new(kv);
        let debouncer = Debouncer::new(kv.clone(), DEFAULT_WINDOW);
        let inbox = Inbox::new(gateway.clone(), kv.clone(), debouncer);
        Self { gateway, kv, inbox }
    }

    pub fn stored(&self, key: PersistKey) -> HashSet<String> {
        load_ids(self.kv.as_ref() as &dyn KeyValueStore, key)
            .into_iter()
            .collect()
    }

    pub fn stored_raw(&self, key: PersistKey) -> Option<String> {
        self.kv.get(key.as_str()).unwrap()
    }
}

pub fn id_set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

pub fn ids_of(emails: &[EmailSummary]) -> Vec<&str> {
    emails.iter().map(|e| e.id.as_str()).collect()
}

/// Let the debounce window elapse on the paused clock and the timer tasks run.
pub async fn past_debounce() {
    tokio::time::sleep(DEFAULT_WINDOW + Duration::from_millis(10)).await;
    tokio::task::yield_now().await;
}
