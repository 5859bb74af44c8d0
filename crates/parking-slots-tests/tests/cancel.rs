use eyre::Result;
use parking_slots_core::{FailureKind, SlotState};
use parking_slots_tests::TestCtxBuilder;
use serde_json::json;
use util::{hours_from_now, slots_where};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_right_after_reserving() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);
    ctx.api.reserve(1, "555", start, end).await??;

    let outcome = ctx.api.cancel("555", Some(1)).await??;
    assert_eq!(outcome.slot_id, 1);
    assert_eq!(outcome.message, "Reservation for Slot 1 canceled successfully.");
    assert_eq!(ctx.api.slot_status(1).await?, SlotState::Available);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_without_slot_frees_oldest_reservation() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(4)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);

    let mut session = ctx.api.create_user_session();
    for slot in [3, 1, 4] {
        session.reserve(slot, start, end).await??;
    }

    assert_eq!(session.cancel(None).await??.slot_id, 3);
    assert_eq!(session.cancel(None).await??.slot_id, 1);
    assert_eq!(session.held, [4]);
    assert_eq!(slots_where(&ctx, SlotState::is_reserved).await?, [4]);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_leaves_state_alone_without_match() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(2)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);
    ctx.api.reserve(1, "555", start, end).await??;
    let before = ctx.api.list_slots().await?;

    for (contact, slot) in [("999", None), ("555", Some(2)), ("555", Some(7))] {
        let err = ctx
            .api
            .cancel(contact, slot)
            .await?
            .expect_err("Nothing matches this cancellation.");
        assert_eq!(err.kind, FailureKind::NotFound);
        assert_eq!(err.msg, "No matching reservation found for cancellation.");
    }
    assert_eq!(ctx.api.list_slots().await?, before);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_payload_handling() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(2)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);
    ctx.api.reserve(2, "555", start, end).await??;

    // A missing contact is reported as not found
    let err = ctx.api.cancel_raw(json!({ "slotId": 2 })).await?.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert_eq!(err.msg, "Contact number is required.");

    // Contacts are trimmed, string ids coerced, blank ids ignored
    let outcome = ctx
        .api
        .cancel_raw(json!({ "contact": "  555 ", "slotId": "2" }))
        .await??;
    assert_eq!(outcome.slot_id, 2);

    ctx.api.reserve(1, "555", start, end).await??;
    let outcome = ctx
        .api
        .cancel_raw(json!({ "contact": "555", "slotId": "" }))
        .await??;
    assert_eq!(outcome.slot_id, 1);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_with_fractional_slot_id() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(2)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);
    ctx.api.reserve(1, "555", start, end).await??;
    ctx.api.reserve(2, "555", start, end).await??;

    // `2.0` is slot 2, not a missing filter
    let outcome = ctx
        .api
        .cancel_raw(json!({ "contact": "555", "slotId": 2.0 }))
        .await??;
    assert_eq!(outcome.slot_id, 2);
    assert_eq!(slots_where(&ctx, SlotState::is_reserved).await?, [1]);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_cancel_with_malformed_body() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);
    ctx.api.reserve(1, "555", start, end).await??;

    // A contact of the wrong type is not the same as no contact
    let err = ctx
        .api
        .cancel_raw(json!({ "contact": 555 }))
        .await?
        .expect_err("A numeric contact must be rejected.");
    assert_eq!(err.kind, FailureKind::InvalidInput);
    assert!(err.msg.starts_with("Malformed request body"), "{}", err.msg);
    assert!(ctx.api.slot_status(1).await?.is_reserved());

    ctx.finish().await;
    Ok(())
}
