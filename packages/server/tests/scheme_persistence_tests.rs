//! Postgres-backed store tests. These need Docker:
//! cargo test --test scheme_persistence_tests -- --ignored

mod common;

use std::sync::Arc;

use careguide_core::domains::chat::{handle_chat, ChatRequest, ChatRole};
use careguide_core::domains::schemes::{PersistedScheme, UNVERIFIED_NOTE};
use careguide_core::kernel::test_dependencies::{MockAssistant, MockEmbeddingService};
use careguide_core::kernel::{
    BaseChatLog, BaseResourceStore, BaseSchemeStore, PgChatLog, PgResourceStore, PgSchemeStore,
    PipelineSettings, ServerDeps,
};
use test_context::test_context;

use crate::common::{candidate, insert_resource, unique, TestHarness};

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_upserts_keep_one_row_per_title(ctx: &mut TestHarness) {
    let store = Arc::new(PgSchemeStore::new(ctx.db_pool.clone()));
    let title = unique("Respite Care Grant");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        // Same normalized title, different spacing and case
        let scheme = if i % 2 == 0 {
            candidate(&title)
        } else {
            candidate(&format!("  {}  ", title.to_uppercase()))
        };
        handles.push(tokio::spawn(async move { store.upsert(&scheme).await }));
    }

    let mut created = 0;
    let mut ids = Vec::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.created {
            created += 1;
        }
        ids.push(outcome.scheme.id);
    }

    assert_eq!(created, 1);
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(
        PersistedScheme::count_by_title(&title, &ctx.db_pool).await.unwrap(),
        1
    );
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn upsert_keeps_first_writer_fields(ctx: &mut TestHarness) {
    let store = PgSchemeStore::new(ctx.db_pool.clone());
    let title = unique("Caregiver Peer Circle");

    let first = store.upsert(&candidate(&title)).await.unwrap();
    let mut second_candidate = candidate(&title.to_lowercase());
    second_candidate.description = "A different description".to_string();
    let second = store.upsert(&second_candidate).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.scheme.id, first.scheme.id);
    assert_eq!(second.scheme.title, title);
    assert_eq!(second.scheme.description, "Found by the assistant");

    let found = store.find_by_title(&title.to_uppercase()).await.unwrap().unwrap();
    assert_eq!(found.id, first.scheme.id);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn resource_store_lookups(ctx: &mut TestHarness) {
    let store = PgResourceStore::new(ctx.db_pool.clone());
    let title = unique("Dementia Day Care");
    let link = format!("https://example.gov/{}", uuid::Uuid::new_v4());
    insert_resource(&ctx.db_pool, &title, &link, "Medical", &["dementia"]).await;

    let by_link = store.find_by_link(&link).await.unwrap().unwrap();
    assert_eq!(by_link.title, title);

    let by_title = store.find_by_title(&title.to_lowercase()).await.unwrap().unwrap();
    assert_eq!(by_title.link, link);

    let matches = store.keyword_search(&title, 5).await.unwrap();
    assert!(matches.iter().any(|r| r.title == title));

    assert!(store
        .find_by_link("https://example.gov/does-not-exist")
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn chat_log_history_is_oldest_first(ctx: &mut TestHarness) {
    let log = PgChatLog::new(ctx.db_pool.clone());
    let user_id = unique("user");

    for i in 0..4 {
        log.append(&user_id, ChatRole::User, &format!("question {}", i))
            .await
            .unwrap();
    }

    let history = log.history(&user_id, 2).await.unwrap();
    let contents: Vec<&str> = history.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["question 2", "question 3"]);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn concurrent_chat_requests_persist_one_scheme(ctx: &mut TestHarness) {
    let title = unique("Home Caregiving Grant");
    let link = format!("https://example.gov/{}", uuid::Uuid::new_v4());
    insert_resource(&ctx.db_pool, &title, &link, "Financial", &["finance"]).await;

    let new_title = unique("Caregiver Support Line");
    let reply = format!(
        r#"[{{"title": "{}", "link": "{}", "category": "grant"}}, {{"title": "{}"}}]"#,
        title, link, new_title
    );

    let deps = ServerDeps::new(
        Arc::new(PgResourceStore::new(ctx.db_pool.clone())),
        Arc::new(PgSchemeStore::new(ctx.db_pool.clone())),
        Arc::new(PgChatLog::new(ctx.db_pool.clone())),
        Arc::new(MockAssistant::new().with_reply(reply)),
        Arc::new(MockEmbeddingService::failing()),
        PipelineSettings::for_tests(),
    );

    let (a, b) = tokio::join!(
        handle_chat(ChatRequest::new("caregiving grant", "u1"), &deps),
        handle_chat(ChatRequest::new("caregiving grant", "u2"), &deps),
    );
    let a = a.unwrap();
    b.unwrap();

    let primary = a.verified_resource.unwrap();
    assert_eq!(primary.link, link);
    assert_eq!(primary.category, "Financial");
    assert_eq!(primary.note, None);

    let unverified = a
        .related_schemes
        .iter()
        .find(|s| s.title == new_title)
        .unwrap();
    assert_eq!(unverified.note.as_deref(), Some(UNVERIFIED_NOTE));

    for t in [&title, &new_title] {
        assert_eq!(
            PersistedScheme::count_by_title(t, &ctx.db_pool).await.unwrap(),
            1
        );
    }
}
