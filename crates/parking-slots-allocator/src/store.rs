//! The unsynchronized slot store
//!
//! [`SlotBook`] holds the slots and their reservations and implements every
//! operation as a plain `&mut self` method. Whoever owns a book is responsible
//! for serializing access to it, see [`SlotAllocator`](crate::SlotAllocator)
//! and the serial [`Worker`](crate::worker::Worker).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_slots_core::{Config, SlotState, SlotView};
use tracing::{debug, info};

use crate::error::{AllocError, AllocResult, SeedError};
use crate::window::Window;

#[derive(Debug)]
struct Slot {
    id: u32,
    status: SlotState,
}

/// An active reservation
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Reservation {
    /// Creation order, used to break ties between reservations of one contact
    seq: u64,
    slot_id: u32,
    contact: String,
    window: Window,
}

impl Reservation {
    #[inline]
    pub fn slot_id(&self) -> u32 {
        self.slot_id
    }

    #[inline]
    pub fn contact(&self) -> &str {
        &self.contact
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }
}

/// Slots and the reservations holding them
#[derive(Debug)]
pub struct SlotBook {
    /// Slots in listing order
    slots: Vec<Slot>,
    /// Position of each slot in `slots`
    index: HashMap<u32, usize>,
    /// Active reservations in creation order
    reservations: Vec<Reservation>,
    next_seq: u64,
}

impl SlotBook {
    /// Create a book from the slots and reservations in `config`
    ///
    /// Seeded reservations are admitted regardless of the current time; those
    /// already over lapse on the first operation.
    pub fn new(config: &Config) -> Result<Self, SeedError> {
        let mut book = Self {
            slots: Vec::with_capacity(config.slots.len()),
            index: HashMap::with_capacity(config.slots.len()),
            reservations: Vec::new(),
            next_seq: 0,
        };

        for seed in &config.slots {
            if seed.id == 0 {
                return Err(SeedError::ZeroSlotId);
            }
            if book.index.insert(seed.id, book.slots.len()).is_some() {
                return Err(SeedError::DuplicateSlot(seed.id));
            }
            let status = if seed.occupied {
                SlotState::Occupied
            } else {
                SlotState::Available
            };
            book.slots.push(Slot {
                id: seed.id,
                status,
            });
        }

        for seed in &config.reservations {
            Window::new(seed.start_time, seed.end_time)
                .and_then(|window| book.admit(seed.slot_id, &seed.contact, window))
                .map_err(|source| SeedError::Reservation {
                    slot: seed.slot_id,
                    source,
                })?;
        }

        Ok(book)
    }

    /// Drop every reservation that is over at `now` and free its slot
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let Self {
            slots,
            index,
            reservations,
            ..
        } = self;

        reservations.retain(|res| {
            if !res.window.has_lapsed(now) {
                return true;
            }
            if let Some(&i) = index.get(&res.slot_id) {
                release(&mut slots[i]);
            }
            debug!(slot = res.slot_id, contact = %res.contact, end = %res.window.end(), "reservation expired");
            false
        });
    }

    /// List all slots with their live status
    pub fn list(&mut self, now: DateTime<Utc>) -> Vec<SlotView> {
        self.expire(now);
        self.slots
            .iter()
            .map(|slot| SlotView {
                id: slot.id,
                status: slot.status,
            })
            .collect()
    }

    /// Reserve `slot_id` for `contact` during `window`
    pub fn reserve(
        &mut self,
        now: DateTime<Utc>,
        slot_id: u32,
        contact: &str,
        window: Window,
    ) -> AllocResult<()> {
        self.expire(now);
        self.admit(slot_id, contact, window)?;
        info!(slot = slot_id, contact = contact.trim(), from = %window.start(), to = %window.end(), "slot reserved");
        Ok(())
    }

    /// Cancel the earliest-created reservation of `contact`, optionally
    /// restricted to `slot_id`, and return the slot it held
    pub fn cancel(
        &mut self,
        now: DateTime<Utc>,
        contact: &str,
        slot_id: Option<u32>,
    ) -> AllocResult<u32> {
        self.expire(now);

        let contact = contact.trim();
        if contact.is_empty() {
            return Err(AllocError::MissingContact);
        }

        let pos = self
            .reservations
            .iter()
            .enumerate()
            .filter(|(_, res)| res.contact == contact)
            .filter(|(_, res)| slot_id.map_or(true, |id| res.slot_id == id))
            .min_by_key(|(_, res)| res.seq)
            .map(|(pos, _)| pos)
            .ok_or(AllocError::NoMatchingReservation)?;

        let canceled = self.reservations.remove(pos);
        if let Some(&i) = self.index.get(&canceled.slot_id) {
            release(&mut self.slots[i]);
        }
        info!(slot = canceled.slot_id, contact, "reservation canceled");
        Ok(canceled.slot_id)
    }

    /// Active reservations in creation order
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Check `contact` and the slot, then record the reservation
    fn admit(&mut self, slot_id: u32, contact: &str, window: Window) -> AllocResult<()> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(AllocError::InvalidInput("Contact number is required.".into()));
        }

        let &i = self
            .index
            .get(&slot_id)
            .ok_or(AllocError::SlotNotFound(slot_id))?;
        let slot = &mut self.slots[i];
        if slot.status != SlotState::Available {
            return Err(AllocError::SlotUnavailable(slot_id));
        }

        slot.status = SlotState::Reserved {
            from: window.start(),
            to: window.end(),
        };
        self.reservations.push(Reservation {
            seq: self.next_seq,
            slot_id,
            contact: contact.to_owned(),
            window,
        });
        self.next_seq += 1;
        Ok(())
    }
}

/// Make a reserved slot available again, leaving blocked slots alone
#[inline]
fn release(slot: &mut Slot) {
    if slot.status.is_reserved() {
        slot.status = SlotState::Available;
    }
}
