//! Lock-based access to the slot store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use parking_slots_core::{Config, SlotView};

use crate::clock::Clock;
use crate::command::{Command, Confirmation, Reply};
use crate::error::{AllocResult, SeedError};
use crate::store::{Reservation, SlotBook};
use crate::window::Window;

/// Owns the slots and reservations and serializes every operation on them
/// with a lock
///
/// Each operation first drops reservations that are over, then runs its
/// check-and-update sequence, all while holding the lock.
pub struct SlotAllocator {
    book: Mutex<SlotBook>,
    clock: Arc<dyn Clock>,
}

impl SlotAllocator {
    /// Create a new [`SlotAllocator`] from the slots and reservations in
    /// `config`
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, SeedError> {
        Ok(Self {
            book: Mutex::new(SlotBook::new(config)?),
            clock,
        })
    }

    /// List all slots with their live status
    pub fn list_slots(&self) -> Vec<SlotView> {
        let mut book = self.book.lock();
        book.list(self.clock.now())
    }

    /// Reserve `slot_id` for `contact` from `start` to `end`
    pub fn reserve(
        &self,
        slot_id: u32,
        contact: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AllocResult<Confirmation> {
        let window = Window::new(start, end)?;
        let mut book = self.book.lock();
        book.reserve(self.clock.now(), slot_id, contact, window)?;
        Ok(Confirmation::reserved(slot_id))
    }

    /// Cancel the earliest reservation made by `contact`, only considering
    /// `slot_id` if given
    pub fn cancel(&self, contact: &str, slot_id: Option<u32>) -> AllocResult<Confirmation> {
        let mut book = self.book.lock();
        let slot_id = book.cancel(self.clock.now(), contact, slot_id)?;
        Ok(Confirmation::canceled(slot_id))
    }

    /// Snapshot of the active reservations, in creation order
    pub fn reservations(&self) -> Vec<Reservation> {
        let mut book = self.book.lock();
        book.expire(self.clock.now());
        book.reservations().to_vec()
    }

    pub(crate) fn apply(&self, command: Command) -> AllocResult<Reply> {
        let mut book = self.book.lock();
        command.apply(&mut book, self.clock.now())
    }
}
