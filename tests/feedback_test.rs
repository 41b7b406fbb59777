// tests/feedback_test.rs
// Material feedback upsert identity and validation.

mod common;

use common::{MockLlm, register_user, test_state};
use coach_backend::materials::NewBook;

#[tokio::test]
async fn feedback_resubmission_updates_in_place() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "reader@example.com").await;

    let book = state
        .materials
        .insert_book(
            &user_id,
            NewBook {
                title: "Deep Work".to_string(),
                author: Some("Cal Newport".to_string()),
                description: None,
            },
        )
        .await?;

    let first = state
        .materials
        .upsert_feedback(&user_id, "book", &book.id, 5, Some("Loved it"), true)
        .await?;

    let second = state
        .materials
        .upsert_feedback(&user_id, "book", &book.id, 2, Some("On reflection, too long"), true)
        .await?;

    // Same identity, new rating - not a second record.
    assert_eq!(first.id, second.id);
    assert_eq!(second.rating, 2);
    assert_eq!(second.review.as_deref(), Some("On reflection, too long"));

    let all = state.materials.list_feedback(&user_id).await?;
    assert_eq!(all.len(), 1);
    Ok(())
}

#[tokio::test]
async fn feedback_rejects_invalid_input() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "strict@example.com").await;

    assert!(
        state
            .materials
            .upsert_feedback(&user_id, "book", "some-id", 0, None, true)
            .await
            .is_err()
    );
    assert!(
        state
            .materials
            .upsert_feedback(&user_id, "book", "some-id", 6, None, true)
            .await
            .is_err()
    );
    assert!(
        state
            .materials
            .upsert_feedback(&user_id, "podcast", "some-id", 3, None, true)
            .await
            .is_err()
    );
    Ok(())
}

#[tokio::test]
async fn same_material_id_different_type_is_distinct() -> anyhow::Result<()> {
    let state = test_state(MockLlm::new(&["ok"])).await;
    let (user_id, _) = register_user(&state, "both@example.com").await;

    state
        .materials
        .upsert_feedback(&user_id, "book", "shared-id", 4, None, true)
        .await?;
    state
        .materials
        .upsert_feedback(&user_id, "video", "shared-id", 1, None, false)
        .await?;

    let all = state.materials.list_feedback(&user_id).await?;
    assert_eq!(all.len(), 2);
    Ok(())
}
