//! 🅿️ The slot reservation engine
//!
//! The store of slots and reservations lives in a [`SlotBook`](store::SlotBook).
//! Access to it is serialized either by a lock ([`SlotAllocator`]) or by a
//! single [worker] thread owning it, and [`SlotService`] answers browser
//! requests with whichever of the two [`launch`] picked.
//!
//! Reservations are never swept in the background. Every operation first drops
//! the reservations whose end time has passed, so a listing may show a slot as
//! reserved until the next request arrives after the reservation is over.

#![allow(rustdoc::private_intra_doc_links)]
use std::sync::Arc;

use parking_slots_core::Config;
use tracing::info;

mod allocator;
mod clock;
mod command;
mod error;
mod service;
mod store;
mod window;
mod worker;

pub use allocator::SlotAllocator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::Confirmation;
pub use error::{AllocError, AllocResult, SeedError};
pub use service::SlotService;
pub use store::Reservation;
use store::SlotBook;
pub use window::{parse_timestamp, Window};

/// Entrypoint of the reservation system
///
/// Builds the store from `config` and puts it behind a lock, or behind a
/// worker thread if `config.serial` is set.
pub fn launch(config: &Config, clock: Arc<dyn Clock>) -> Result<SlotService, SeedError> {
    info!(
        slots = config.slots.len(),
        reservations = config.reservations.len(),
        serial = config.serial,
        "launching slot service"
    );
    if config.serial {
        let book = SlotBook::new(config)?;
        Ok(SlotService::serial(worker::Worker::spawn(book, clock)))
    } else {
        Ok(SlotService::locked(SlotAllocator::new(config, clock)?))
    }
}
