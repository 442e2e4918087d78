use std::collections::HashSet;
use std::sync::Arc;

use restaurant_lib::{get_feedbacks, Error, Feedback, FeedbackQuery, InMemoryStore, Stores};

fn seeded(count: usize) -> Stores {
    let store = (0..count).fold(InMemoryStore::new(), |store, i| {
        store.with_feedback(Feedback {
            id: format!("f-{i:02}"),
            rate: (i % 5) as f64 + 1.0,
            comment: format!("comment {i}"),
            user_name: "Guest".into(),
            user_avatar_url: String::new(),
            date: format!("2025-01-{:02}", (i % 28) + 1),
            feedback_type: "SERVICE".into(),
            location_id: "7".into(),
        })
    });
    let store = store.with_feedback(Feedback {
        id: "other".into(),
        rate: 5.0,
        comment: String::new(),
        user_name: String::new(),
        user_avatar_url: String::new(),
        date: "2025-01-01".into(),
        feedback_type: "CUISINE_EXPERIENCE".into(),
        location_id: "7".into(),
    });
    Stores::from_backend(Arc::new(store))
}

fn query(page: &str, size: &str, cursor: Option<&str>) -> FeedbackQuery {
    FeedbackQuery::parse("7", Some("SERVICE"), Some(page), Some(size), None, cursor).unwrap()
}

#[tokio::test]
async fn pages_are_disjoint_and_counted() {
    let stores = seeded(25);

    let first = get_feedbacks(&stores, &query("0", "10", None)).await.unwrap();
    let second = get_feedbacks(&stores, &query("1", "10", None)).await.unwrap();
    let third = get_feedbacks(&stores, &query("2", "10", None)).await.unwrap();

    assert_eq!(first.content.len(), 10);
    assert_eq!(second.content.len(), 10);
    assert_eq!(third.content.len(), 5);
    assert_eq!(first.total_elements, 25);
    assert_eq!(first.total_pages(), 3);

    assert!(first.is_first());
    assert!(!second.is_first());
    assert!(!first.is_last());
    assert!(third.is_last());

    let a: HashSet<_> = first.content.iter().map(|f| f.id.clone()).collect();
    let b: HashSet<_> = second.content.iter().map(|f| f.id.clone()).collect();
    assert!(a.is_disjoint(&b));
}

#[tokio::test]
async fn cursor_resumes_where_previous_page_stopped() {
    let stores = seeded(25);

    let first = get_feedbacks(&stores, &query("0", "10", None)).await.unwrap();
    let cursor = first.next_cursor.clone().expect("first page has a cursor");

    let via_cursor = get_feedbacks(&stores, &query("1", "10", Some(&cursor)))
        .await
        .unwrap();
    let via_walk = get_feedbacks(&stores, &query("1", "10", None)).await.unwrap();

    assert_eq!(via_cursor.content, via_walk.content);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let stores = seeded(5);
    let page = get_feedbacks(&stores, &query("3", "10", None)).await.unwrap();
    assert!(page.is_empty());
    assert!(page.is_last());
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn sort_orders_the_fetched_page() {
    let stores = seeded(10);
    let query =
        FeedbackQuery::parse("7", Some("SERVICE"), None, Some("10"), Some("rate,desc"), None)
            .unwrap();

    let page = get_feedbacks(&stores, &query).await.unwrap();
    let rates: Vec<f64> = page.content.iter().map(|f| f.rate).collect();
    let mut sorted = rates.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(rates, sorted);
}

#[tokio::test]
async fn tampered_cursor_is_rejected() {
    let err = FeedbackQuery::parse("7", Some("SERVICE"), None, None, None, Some("%%%"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
}
