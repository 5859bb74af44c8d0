use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use parking_slots_core::SlotState;
use parking_slots_tests::TestCtx;

/// Window from now lasting `hours`
#[allow(unused)]
pub fn hours_from_now(ctx: &TestCtx, hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = ctx.now();
    (now, now + Duration::hours(hours))
}

/// Ids of the slots currently in the given state
#[allow(unused)]
pub async fn slots_where(ctx: &TestCtx, pred: impl Fn(&SlotState) -> bool) -> Result<Vec<u32>> {
    Ok(ctx
        .api
        .list_slots()
        .await?
        .into_iter()
        .filter(|s| pred(&s.status))
        .map(|s| s.id)
        .collect())
}
