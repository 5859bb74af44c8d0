use chrono::Duration;
use eyre::Result;
use parking_slots_core::SlotState;
use parking_slots_tests::TestCtxBuilder;

mod util;

#[tokio::test] // Every test function needs to be decorated with this attribute
#[ntest::timeout(20_000)] // Test timeout in ms
async fn test_example() -> Result<()> {
    // Create a test context with a single available slot
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .build()
        .await?;
    let t0 = ctx.now();

    // Reserve it for two hours
    let outcome = ctx
        .api
        .reserve(1, "555", t0, t0 + Duration::hours(2))
        .await??;
    assert_eq!(outcome.slot_id, 1);
    assert_eq!(outcome.message, "Slot 1 reserved successfully.");

    // An hour in, the slot is held for the whole window
    ctx.clock.advance(Duration::hours(1));
    assert_eq!(
        ctx.api.slot_status(1).await?,
        SlotState::Reserved {
            from: t0,
            to: t0 + Duration::hours(2)
        },
        "The slot must be reserved during the window."
    );

    // Past the window, the slot is free again and the reservation gone
    ctx.clock.advance(Duration::hours(2));
    assert_eq!(ctx.api.slot_status(1).await?, SlotState::Available);
    assert!(
        ctx.api.cancel("555", Some(1)).await?.is_err(),
        "An expired reservation must not be cancelable."
    );

    // Finish the test
    ctx.finish().await;
    Ok(())
}
