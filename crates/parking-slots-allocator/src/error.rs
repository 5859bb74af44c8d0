//! Errors of the allocator

use parking_slots_core::FailureKind;
use thiserror::Error;

/// Why a reservation or cancellation was refused
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum AllocError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Slot {0} not found.")]
    SlotNotFound(u32),

    #[error("Contact number is required.")]
    MissingContact,

    #[error("No matching reservation found for cancellation.")]
    NoMatchingReservation,

    #[error("Slot {0} is not available.")]
    SlotUnavailable(u32),
}

impl AllocError {
    /// Kind the error is reported to clients as
    pub fn kind(&self) -> FailureKind {
        match self {
            AllocError::InvalidInput(_) => FailureKind::InvalidInput,
            AllocError::SlotNotFound(_)
            | AllocError::MissingContact
            | AllocError::NoMatchingReservation => FailureKind::NotFound,
            AllocError::SlotUnavailable(_) => FailureKind::Conflict,
        }
    }
}

/// Problems with the slots and reservations handed to [`launch`](crate::launch)
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("slot ids must be positive")]
    ZeroSlotId,

    #[error("slot {0} is listed twice")]
    DuplicateSlot(u32),

    #[error("reservation for slot {slot} rejected: {source}")]
    Reservation {
        slot: u32,
        #[source]
        source: AllocError,
    },
}

pub type AllocResult<T> = std::result::Result<T, AllocError>;
