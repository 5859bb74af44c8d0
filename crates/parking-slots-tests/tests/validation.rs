use chrono::Duration;
use eyre::Result;
use parking_slots_core::{FailureKind, SlotState};
use parking_slots_tests::TestCtxBuilder;
use serde_json::json;

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_window_must_end_after_start() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .build()
        .await?;
    let t0 = ctx.now();

    for end in [t0, t0 - Duration::minutes(30)] {
        let err = ctx
            .api
            .reserve(1, "555", t0, end)
            .await?
            .expect_err("A window must end after it starts.");
        assert_eq!(err.kind, FailureKind::InvalidInput);
    }
    assert_eq!(ctx.api.slot_status(1).await?, SlotState::Available);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_malformed_reservations_are_rejected() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .build()
        .await?;
    let before = ctx.api.list_slots().await?;

    let payloads = [
        json!({ "contact": "555", "startTime": "2024-12-28T12:00", "endTime": "2024-12-28T13:00" }),
        json!({ "slotId": "one", "contact": "555", "startTime": "2024-12-28T12:00", "endTime": "2024-12-28T13:00" }),
        json!({ "slotId": 1, "startTime": "2024-12-28T12:00", "endTime": "2024-12-28T13:00" }),
        json!({ "slotId": 1, "contact": "  ", "startTime": "2024-12-28T12:00", "endTime": "2024-12-28T13:00" }),
        json!({ "slotId": 1, "contact": "555", "endTime": "2024-12-28T13:00" }),
        json!({ "slotId": 1, "contact": "555", "startTime": "noon", "endTime": "2024-12-28T13:00" }),
        json!([1, "555"]),
    ];
    for payload in payloads {
        let err = ctx
            .api
            .reserve_raw(payload.clone())
            .await?
            .expect_err("Malformed reservations must be rejected.");
        assert_eq!(err.kind, FailureKind::InvalidInput, "{payload}");
    }
    assert_eq!(ctx.api.list_slots().await?, before);

    // Fields of the wrong type are reported as a malformed body
    let err = ctx
        .api
        .reserve_raw(json!({ "slotId": 1, "contact": 555, "startTime": "2024-12-28T12:00", "endTime": "2024-12-28T13:00" }))
        .await?
        .expect_err("A numeric contact must be rejected.");
    assert_eq!(err.kind, FailureKind::InvalidInput);
    assert!(err.msg.starts_with("Malformed request body"), "{}", err.msg);

    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_browser_payloads_are_accepted() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(2)
        .build()
        .await?;

    // What a `datetime-local` input and a text field produce
    let outcome = ctx
        .api
        .reserve_raw(json!({
            "slotId": "2",
            "contact": "555",
            "startTime": "2024-12-28T12:30",
            "endTime": "2024-12-28T14:30",
        }))
        .await??;
    assert_eq!(outcome.slot_id, 2);
    assert!(ctx.api.slot_status(2).await?.is_reserved());

    ctx.finish().await;
    Ok(())
}
