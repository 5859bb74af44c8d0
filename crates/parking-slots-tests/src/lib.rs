use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use eyre::Result;
use parking_slots_allocator::ManualClock;
use parking_slots_core::{Config, ReservationSeed, SlotSeed};

mod api;
pub use api::{Api, ApiError, ApiResult, Outcome, UserSession};

/// Default start of the simulated time
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 28, 12, 0, 0).unwrap()
}

pub struct TestCtxBuilder {
    /// Slots and reservations to launch with
    pub config: Config,
    /// Count of request handler threads
    pub handler_threads: u16,
    /// Time the simulated clock starts at
    pub start: DateTime<Utc>,
}

impl TestCtxBuilder {
    /// Create a new test context builder initialized with environment defaults
    ///
    /// Setting `PARKING_SERIAL` to anything but `0`, `false`, `no` or `off`
    /// runs the tests against the serial worker instead of the lock.
    pub fn from_env() -> Result<Self> {
        let serial = std::env::var_os("PARKING_SERIAL").is_some_and(|v| {
            v != "0"
                && !v.eq_ignore_ascii_case("false")
                && !v.eq_ignore_ascii_case("no")
                && !v.eq_ignore_ascii_case("off")
        });

        Ok(TestCtxBuilder {
            config: Config {
                serial,
                ..Config::with_available_slots(1..=6)
            },
            handler_threads: 2,
            start: epoch(),
        })
    }

    /// Replace the slots with `n` available ones, numbered from 1
    pub fn with_available_slots(mut self, n: u32) -> Self {
        self.config.slots = (1..=n)
            .map(|id| SlotSeed {
                id,
                occupied: false,
            })
            .collect();
        self
    }

    /// Mark slot `id` as permanently occupied
    pub fn with_occupied_slot(mut self, id: u32) -> Self {
        match self.config.slots.iter_mut().find(|s| s.id == id) {
            Some(slot) => slot.occupied = true,
            None => self.config.slots.push(SlotSeed { id, occupied: true }),
        }
        self
    }

    /// Add a reservation present at launch
    pub fn with_reservation(
        mut self,
        slot_id: u32,
        contact: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        self.config.reservations.push(ReservationSeed {
            slot_id,
            contact: contact.into(),
            start_time,
            end_time,
        });
        self
    }

    /// Serve requests from a single worker thread
    pub fn serial(mut self, serial: bool) -> Self {
        self.config.serial = serial;
        self
    }

    /// Set the number of request handler threads to use
    pub fn with_handler_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.handler_threads = threads;
        self
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let clock = Arc::new(ManualClock::new(self.start));
        let (service, api) =
            api::mock::start(self.handler_threads, self.config.clone(), clock.clone()).await?;

        Ok(TestCtx {
            api,
            clock,
            service,
            config: self.config,
            drop_bomb: DropBomb,
        })
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the reservation system
    pub api: Api,
    /// The clock the reservation system reads
    pub clock: Arc<ManualClock>,
    service: api::mock::MockService,
    /// Configuration the system was launched with
    pub config: Config,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Current simulated time
    pub fn now(&self) -> DateTime<Utc> {
        use parking_slots_allocator::Clock;
        self.clock.now()
    }

    /// Shut the reservation system down and finish the test
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.service.shutdown().await;
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the reservation system down");
    }
}
