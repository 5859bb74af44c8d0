use std::collections::HashSet;

use eyre::Result;
use futures::future::join_all;
use parking_slots_core::{FailureKind, SlotState};
use parking_slots_tests::TestCtxBuilder;
use util::{hours_from_now, slots_where};

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_racing_reservations_admit_one_holder() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(1)
        .with_handler_threads(8)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 1);

    // Each clone talks to the next handler thread
    let apis: Vec<_> = std::iter::successors(Some(ctx.api.clone()), |api| Some(api.clone()))
        .take(8)
        .collect();
    let attempts = apis.iter().enumerate().flat_map(|(i, api)| {
        (0..25).map(move |j| async move {
            api.reserve(1, &format!("{i}-{j}"), start, end).await
        })
    });
    let results = join_all(attempts).await;

    let mut winners = 0;
    for result in results {
        match result? {
            Ok(_) => winners += 1,
            Err(err) => assert_eq!(err.kind, FailureKind::Conflict),
        }
    }
    assert_eq!(winners, 1, "Exactly one reservation must win the slot.");
    assert_eq!(slots_where(&ctx, SlotState::is_reserved).await?, [1]);

    drop(apis);
    ctx.finish().await;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_many_drivers_fill_the_lot() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?
        .with_available_slots(50)
        .with_handler_threads(4)
        .build()
        .await?;
    let (start, end) = hours_from_now(&ctx, 2);

    // Every driver tries every slot until one sticks
    let drivers = (0..60).map(|i| {
        let api = ctx.api.clone();
        async move {
            for slot in 1..=50 {
                let contact = format!("driver-{i}");
                if api.reserve(slot, &contact, start, end).await?.is_ok() {
                    return eyre::Ok(Some(slot));
                }
            }
            Ok(None)
        }
    });
    let won: Vec<Option<u32>> = join_all(drivers)
        .await
        .into_iter()
        .collect::<Result<_>>()?;

    let slots: HashSet<u32> = won.iter().flatten().copied().collect();
    assert_eq!(slots.len(), 50, "Every slot must be held by one driver.");
    assert_eq!(won.iter().filter(|w| w.is_none()).count(), 10);
    assert!(slots_where(&ctx, |s| *s == SlotState::Available)
        .await?
        .is_empty());

    ctx.finish().await;
    Ok(())
}
