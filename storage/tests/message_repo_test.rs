//! Integration tests for [`storage::MessageRepository`] against an in-memory database.

use storage::{Database, MessageQuery, MessageRecord, MessageRepository, DIRECTION_RECEIVED};

async fn setup() -> MessageRepository {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open database")
        .messages()
}

fn inbound(user_id: i64, chat_id: i64, content: &str) -> MessageRecord {
    MessageRecord::received(user_id, chat_id, "text", content).with_profile(
        Some(format!("player{}", user_id)),
        Some("Player".to_string()),
        None,
    )
}

/// **Test: A saved row can be found again by id with its profile snapshot.**
///
/// **Setup:** Save one inbound message from user 123 in chat 456.
/// **Action:** `find(&id)`, then `find` on an unknown id.
/// **Expected:** First returns the row unchanged; second returns `None`.
#[tokio::test]
async fn test_find_by_id() {
    let repo = setup().await;
    let saved = inbound(123, 456, "/load main");
    repo.save(&saved).await.expect("Failed to save message");

    let found = repo
        .find(&saved.id)
        .await
        .expect("Failed to query")
        .expect("message should exist");
    assert_eq!(found.content, "/load main");
    assert_eq!((found.user_id, found.chat_id), (123, 456));
    assert_eq!(found.username.as_deref(), Some("player123"));
    assert_eq!(found.direction, DIRECTION_RECEIVED);

    assert!(repo.find("no-such-id").await.unwrap().is_none());
}

/// **Test: recent_in_chat honours the limit and stays inside the chat.**
///
/// **Setup:** 12 messages in chat 12345, 3 in chat 999.
/// **Action:** `recent_in_chat(12345, 5)` and `recent_in_chat(42, 5)`.
/// **Expected:** 5 rows all from 12345; nothing for the empty chat.
#[tokio::test]
async fn test_recent_in_chat() {
    let repo = setup().await;

    for i in 0..12 {
        repo.save(&inbound(100 + i, 12345, &format!("move {}", i)))
            .await
            .unwrap();
    }
    for i in 0..3 {
        repo.save(&inbound(7, 999, &format!("elsewhere {}", i)))
            .await
            .unwrap();
    }

    let recent = repo.recent_in_chat(12345, 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert!(recent.iter().all(|m| m.chat_id == 12345));

    assert!(repo.recent_in_chat(42, 5).await.unwrap().is_empty());
}

/// **Test: list combines user, direction and limit filters.**
#[tokio::test]
async fn test_list_filters() {
    let repo = setup().await;

    repo.save(&inbound(1, 1, "/slots")).await.unwrap();
    repo.save(&MessageRecord::sent(1, 1, "Your slots:")).await.unwrap();
    repo.save(&inbound(1, 1, "/balance")).await.unwrap();
    repo.save(&inbound(2, 2, "/start")).await.unwrap();

    let received_from_1 = repo
        .list(&MessageQuery {
            user_id: Some(1),
            direction: Some(DIRECTION_RECEIVED.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(received_from_1.len(), 2);
    assert!(received_from_1
        .iter()
        .all(|m| m.user_id == 1 && m.is_received()));

    let capped = repo
        .list(&MessageQuery {
            limit: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 3);

    let all = repo.list(&MessageQuery::default()).await.unwrap();
    assert_eq!(all.len(), 4);
}

/// **Test: search treats LIKE wildcards in the keyword literally.**
///
/// **Setup:** One message containing "100%", one plain message.
/// **Action:** `search("level")`, `search("%")`.
/// **Expected:** Each keyword matches only the row that really contains it.
#[tokio::test]
async fn test_search_matches_literal_substring() {
    let repo = setup().await;

    repo.save(&inbound(1, 1, "/save main level=3")).await.unwrap();
    repo.save(&inbound(1, 1, "progress 100%")).await.unwrap();
    repo.save(&inbound(1, 1, "hello")).await.unwrap();

    let by_word = repo.search("level", 10).await.unwrap();
    assert_eq!(by_word.len(), 1);
    assert_eq!(by_word[0].content, "/save main level=3");

    let by_percent = repo.search("%", 10).await.unwrap();
    assert_eq!(by_percent.len(), 1);
    assert_eq!(by_percent[0].content, "progress 100%");
}

/// **Test: delete_older_than removes only rows older than the cutoff.**
///
/// **Setup:** One message backdated 10 days, one fresh message.
/// **Action:** `delete_older_than(7)`.
/// **Expected:** One row deleted; the fresh message remains.
#[tokio::test]
async fn test_delete_older_than() {
    let repo = setup().await;

    let mut stale = inbound(1, 1, "old");
    stale.created_at = chrono::Utc::now() - chrono::Duration::days(10);
    let fresh = inbound(1, 1, "fresh");
    repo.save(&stale).await.unwrap();
    repo.save(&fresh).await.unwrap();

    assert_eq!(repo.delete_older_than(7).await.unwrap(), 1);
    assert!(repo.find(&stale.id).await.unwrap().is_none());
    assert!(repo.find(&fresh.id).await.unwrap().is_some());
}
