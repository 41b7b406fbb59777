// tests/chat_store_test.rs
// Chat session manager behavior: recency ordering, placeholder
// filtering, duplicate-save guard, and the delete-current handoff.

mod common;

use common::{MockLlm, register_user, test_state};

#[tokio::test]
async fn placeholder_chats_with_no_messages_are_hidden() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "list@example.com").await;

    let untouched = state.chats.create_chat(&user_id, None).await?;
    let titled = state.chats.create_chat(&user_id, Some("Career plans")).await?;
    let with_message = state.chats.create_chat(&user_id, None).await?;
    state
        .chats
        .append_message(&user_id, &with_message.id, "user", "hello")
        .await?;

    let listed = state.chats.list_chats(&user_id).await?;
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();

    assert!(!ids.contains(&untouched.id.as_str()));
    assert!(ids.contains(&titled.id.as_str()));
    assert!(ids.contains(&with_message.id.as_str()));
    Ok(())
}

#[tokio::test]
async fn appending_promotes_chat_to_front() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "order@example.com").await;

    let first = state.chats.create_chat(&user_id, Some("First")).await?;
    let second = state.chats.create_chat(&user_id, Some("Second")).await?;

    // SQLite CURRENT_TIMESTAMP has second resolution; space the writes.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    state
        .chats
        .append_message(&user_id, &first.id, "user", "bump")
        .await?;

    let listed = state.chats.list_chats(&user_id).await?;
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
    Ok(())
}

#[tokio::test]
async fn duplicate_message_in_window_is_dropped() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "dup@example.com").await;

    let chat = state.chats.create_chat(&user_id, None).await?;

    let saved = state
        .chats
        .append_message(&user_id, &chat.id, "user", "same text")
        .await?;
    assert!(saved.is_some());

    let duplicate = state
        .chats
        .append_message(&user_id, &chat.id, "user", "same text")
        .await?;
    assert!(duplicate.is_none());

    // A different role is not a duplicate.
    let reply = state
        .chats
        .append_message(&user_id, &chat.id, "assistant", "same text")
        .await?;
    assert!(reply.is_some());

    assert_eq!(state.chats.count_messages(&chat.id).await?, 2);
    Ok(())
}

#[tokio::test]
async fn deleting_active_chat_hands_back_survivor() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "del@example.com").await;

    let keep = state.chats.create_chat(&user_id, Some("Keep me")).await?;
    let doomed = state.chats.create_chat(&user_id, Some("Delete me")).await?;
    state
        .chats
        .append_message(&user_id, &doomed.id, "user", "bye")
        .await?;

    let next = state
        .chats
        .delete_chat(&user_id, &doomed.id)
        .await?
        .expect("chat existed");

    assert_eq!(next.id, keep.id);
    assert!(state.chats.get_chat(&user_id, &doomed.id).await?.is_none());
    // Cascade removed its messages too.
    assert_eq!(state.chats.count_messages(&doomed.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn deleting_last_chat_creates_fresh_one() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "last@example.com").await;

    let only = state.chats.create_chat(&user_id, Some("Only chat")).await?;
    let next = state
        .chats
        .delete_chat(&user_id, &only.id)
        .await?
        .expect("chat existed");

    assert_ne!(next.id, only.id);
    assert_eq!(next.title, coach_backend::chat::PLACEHOLDER_TITLE);
    Ok(())
}

#[tokio::test]
async fn deleting_unknown_chat_is_none() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "missing@example.com").await;

    assert!(state.chats.delete_chat(&user_id, "no-such-chat").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn chats_are_scoped_to_their_owner() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (alice, _) = register_user(&state, "alice@example.com").await;
    let (bob, _) = register_user(&state, "bob@example.com").await;

    let chat = state.chats.create_chat(&alice, Some("Private")).await?;

    assert!(state.chats.get_chat(&bob, &chat.id).await?.is_none());
    assert!(state.chats.delete_chat(&bob, &chat.id).await?.is_none());
    Ok(())
}
