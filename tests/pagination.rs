mod common;

use std::time::Duration;

use common::{FakeGateway, Harness, ids_of};
use rs_inbox::domain::filter::Filter;
use rs_inbox::error::StoreError;
use rs_inbox::store::kv::MemoryKv;

#[tokio::test(start_paused = true)]
async fn reloading_a_page_hits_the_cache() {
    let h = Harness::new(FakeGateway::with_emails(25));

    for page in 1..=3 {
        assert!(h.inbox.load_page(page).await);
        assert!(h.inbox.load_page(page).await);
        assert_eq!(h.gateway.page_calls(page), 1, "page {page}");
        assert!(h.inbox.is_cached_page(page));
    }

    assert!(h.inbox.prev_page().await);
    assert!(h.inbox.prev_page().await);
    assert_eq!(h.inbox.page(), 1);
    assert_eq!(h.gateway.page_calls(1), 1);
}

#[tokio::test(start_paused = true)]
async fn total_pages_from_server_total() {
    let h = Harness::new(FakeGateway::with_emails(25));

    assert_eq!(h.inbox.total_pages(), 1);
    assert!(h.inbox.load_page(1).await);
    assert_eq!(h.inbox.total_pages(), 3);

    assert!(!h.inbox.load_page(4).await);
    assert!(!h.inbox.load_page(0).await);
    assert_eq!(h.gateway.page_calls(4), 0);
    assert_eq!(h.inbox.page(), 1);
}

#[tokio::test(start_paused = true)]
async fn pager_is_a_no_op_at_the_boundaries() {
    let h = Harness::new(FakeGateway::with_emails(25));
    h.inbox.load_page(1).await;

    let before = h.gateway.total_calls();
    assert!(!h.inbox.prev_page().await);
    assert_eq!(h.gateway.total_calls(), before);
    assert_eq!(h.inbox.page(), 1);

    assert!(h.inbox.next_page().await);
    assert!(h.inbox.next_page().await);
    assert_eq!(h.inbox.page(), 3);
    assert_eq!(h.inbox.page_emails().len(), 5);

    let before = h.gateway.total_calls();
    let snapshot = h.inbox.snapshot();
    assert!(!h.inbox.next_page().await);
    assert_eq!(h.gateway.total_calls(), before);
    assert_eq!(h.inbox.snapshot(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn pages_are_spliced_at_their_offset() {
    let h = Harness::new(FakeGateway::with_emails(25));
    h.inbox.load_page(1).await;
    h.inbox.load_page(3).await;

    assert_eq!(ids_of(&h.inbox.page_emails()), ["e21", "e22", "e23", "e24", "e25"]);

    h.inbox.load_page(2).await;
    let page2 = h.inbox.page_emails();
    assert_eq!(page2.first().unwrap().id, "e11");
    assert_eq!(page2.last().unwrap().id, "e20");

    h.inbox.load_page(1).await;
    assert_eq!(h.inbox.page_emails().first().unwrap().id, "e1");
}

#[tokio::test(start_paused = true)]
async fn persisted_favorites_are_merged_on_load() {
    let kv = MemoryKv::new().with_entry("favoriteEmails", r#"["e1","e3"]"#);
    let h = Harness::with_kv(FakeGateway::with_emails(25), kv);

    h.inbox.load_page(1).await;

    let favorites: Vec<_> = h
        .inbox
        .page_emails()
        .into_iter()
        .filter(|e| e.favorite)
        .map(|e| e.id)
        .collect();
    assert_eq!(favorites, ["e1", "e3"]);
    assert!(h.inbox.page_emails().iter().all(|e| !e.read));
}

#[tokio::test(start_paused = true)]
async fn persisted_read_ids_are_merged_on_load() {
    let kv = MemoryKv::new().with_entry("readEmails", r#"["e12"]"#);
    let h = Harness::with_kv(FakeGateway::with_emails(25), kv);

    h.inbox.load_page(1).await;
    h.inbox.next_page().await;

    assert_eq!(ids_of(&h.inbox.apply_filter(Filter::Read)), ["e12"]);
}

#[tokio::test(start_paused = true)]
async fn list_failure_keeps_previous_list() {
    let h = Harness::new(FakeGateway::with_emails(25));
    h.inbox.load_page(1).await;
    h.gateway.set_page_failing(2, true);

    assert!(h.inbox.next_page().await);
    assert!(matches!(h.inbox.error(), Some(StoreError::FetchListFailed(_))));
    assert_eq!(h.inbox.error_message().as_deref(), Some("Failed to fetch emails"));
    assert!(!h.inbox.is_loading());
    assert_eq!(h.inbox.page(), 1);
    assert_eq!(h.inbox.page_emails().len(), 10);
    assert!(!h.inbox.is_cached_page(2));

    // Retrying is just asking again.
    h.gateway.set_page_failing(2, false);
    assert!(h.inbox.next_page().await);
    assert_eq!(h.inbox.page(), 2);
    assert_eq!(h.inbox.error(), None);
    assert_eq!(h.gateway.page_calls(2), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_page_loads_are_dropped() {
    let h = Harness::new(FakeGateway::with_emails(25));
    h.inbox.load_page(1).await;
    h.gateway.set_page_delay(Duration::from_millis(100));

    let (second, third) = tokio::join!(h.inbox.load_page(2), async {
        tokio::task::yield_now().await;
        assert!(h.inbox.is_loading());
        h.inbox.load_page(3).await
    });

    assert!(second);
    assert!(!third);
    assert_eq!(h.gateway.page_calls(3), 0);
    assert_eq!(h.inbox.page(), 2);
    assert!(!h.inbox.is_loading());
}

#[tokio::test(start_paused = true)]
async fn dropped_page_load_releases_the_loading_flag() {
    let h = Harness::new(FakeGateway::with_emails(25));
    h.inbox.load_page(1).await;
    h.gateway.set_page_delay(Duration::from_secs(10));

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), h.inbox.load_page(2)).await;
    assert!(timed_out.is_err());
    assert!(!h.inbox.is_loading());

    h.gateway.set_page_delay(Duration::ZERO);
    assert!(h.inbox.load_page(2).await);
    assert_eq!(h.inbox.page(), 2);
}

#[tokio::test(start_paused = true)]
async fn filters_are_views_over_the_current_page() {
    let kv = MemoryKv::new()
        .with_entry("favoriteEmails", r#"["e2"]"#)
        .with_entry("readEmails", r#"["e1","e2"]"#);
    let h = Harness::with_kv(FakeGateway::with_emails(25), kv);
    h.inbox.load_page(1).await;

    assert_eq!(h.inbox.apply_filter(Filter::All).len(), 10);
    assert_eq!(ids_of(&h.inbox.apply_filter(Filter::Read)), ["e1", "e2"]);
    assert_eq!(h.inbox.apply_filter(Filter::Unread).len(), 8);
    assert_eq!(ids_of(&h.inbox.apply_filter(Filter::Favorites)), ["e2"]);
    assert_eq!(h.inbox.filter(), Filter::All);

    h.inbox.set_filter(Filter::Favorites);
    let view = h.inbox.snapshot();
    assert_eq!(ids_of(&view.emails), ["e2"]);
    assert_eq!(view.unfiltered_count, 10);
    assert_eq!(h.inbox.filtered_count(), 1);
    assert_eq!(h.inbox.unfiltered_count(), 10);
    assert!(!view.show_pagination);
    assert_eq!((view.page, view.total_pages), (1, 3));

    h.inbox.set_filter(Filter::All);
    assert!(h.inbox.snapshot().show_pagination);
    assert_eq!(h.inbox.visible_emails().len(), 10);
}
