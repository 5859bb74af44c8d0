//! Decoding requests into store operations and answering them

use chrono::{DateTime, Utc};
use parking_slots_core::{CancelForm, LooseSlotId, Request, RequestKind, ReserveForm, SlotView};
use tracing::warn;

use crate::error::{AllocError, AllocResult};
use crate::store::SlotBook;
use crate::window::Window;

/// Outcome of a successful reservation or cancellation
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Confirmation {
    pub slot_id: u32,
    pub message: String,
}

impl Confirmation {
    pub(crate) fn reserved(slot_id: u32) -> Self {
        Self {
            slot_id,
            message: format!("Slot {slot_id} reserved successfully."),
        }
    }

    pub(crate) fn canceled(slot_id: u32) -> Self {
        Self {
            slot_id,
            message: format!("Reservation for Slot {slot_id} canceled successfully."),
        }
    }
}

/// A decoded request, ready to be applied to a [`SlotBook`]
#[derive(Debug)]
pub(crate) enum Command {
    List,
    Reserve {
        slot_id: u32,
        contact: String,
        window: Window,
    },
    Cancel {
        contact: String,
        slot_id: Option<u32>,
    },
}

#[derive(Debug)]
pub(crate) enum Reply {
    Slots(Vec<SlotView>),
    Done(Confirmation),
}

impl Command {
    /// Read the payload of `rq`
    ///
    /// This happens before the store is touched, so rejected payloads never
    /// wait for the store.
    pub fn decode(rq: &mut Request) -> AllocResult<Self> {
        match rq.kind() {
            RequestKind::ListSlots => Ok(Command::List),
            RequestKind::Reserve => {
                let form: ReserveForm = rq.read_json().map_err(malformed)?;
                let slot_id = match &form.slot_id {
                    Some(id) if !id.is_blank() => id.coerce().ok_or_else(|| {
                        AllocError::InvalidInput(format!("Slot id {} is not valid.", show(id)))
                    })?,
                    _ => return Err(AllocError::InvalidInput("Slot id is required.".into())),
                };
                let contact = form
                    .contact
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| AllocError::InvalidInput("Contact number is required.".into()))?;
                let window = Window::parse(form.start_time.as_deref(), form.end_time.as_deref())?;
                Ok(Command::Reserve {
                    slot_id,
                    contact,
                    window,
                })
            }
            RequestKind::Cancel => {
                let form: CancelForm = rq.read_json().map_err(malformed)?;
                let contact = form
                    .contact
                    .filter(|c| !c.trim().is_empty())
                    .ok_or(AllocError::MissingContact)?;
                let slot_id = match &form.slot_id {
                    Some(id) if !id.is_blank() => {
                        // an id no slot can carry matches no reservation
                        Some(id.coerce().ok_or(AllocError::NoMatchingReservation)?)
                    }
                    _ => None,
                };
                Ok(Command::Cancel { contact, slot_id })
            }
            RequestKind::Debug => Err(AllocError::InvalidInput(
                "Debug requests carry no command.".into(),
            )),
        }
    }

    /// Run the command against `book` as one critical section
    pub fn apply(self, book: &mut SlotBook, now: DateTime<Utc>) -> AllocResult<Reply> {
        match self {
            Command::List => Ok(Reply::Slots(book.list(now))),
            Command::Reserve {
                slot_id,
                contact,
                window,
            } => {
                book.reserve(now, slot_id, &contact, window)?;
                Ok(Reply::Done(Confirmation::reserved(slot_id)))
            }
            Command::Cancel { contact, slot_id } => {
                let slot_id = book.cancel(now, &contact, slot_id)?;
                Ok(Reply::Done(Confirmation::canceled(slot_id)))
            }
        }
    }
}

/// Send the outcome of a command back to the browser
pub(crate) fn respond(rq: Request, outcome: AllocResult<Reply>) {
    match outcome {
        Ok(Reply::Slots(slots)) => rq.respond_with_slots(&slots),
        Ok(Reply::Done(Confirmation { slot_id, message })) => {
            rq.respond_with_success(slot_id, message)
        }
        Err(err) => {
            warn!(request = %rq.id(), kind = ?rq.kind(), failure = %err.kind(), "{err}");
            rq.respond_with_err(err.kind(), err.to_string());
        }
    }
}

fn malformed(err: impl std::fmt::Display) -> AllocError {
    AllocError::InvalidInput(format!("Malformed request body: {err}"))
}

fn show(id: &LooseSlotId) -> String {
    match id {
        LooseSlotId::Number(n) => n.to_string(),
        LooseSlotId::Float(n) => n.to_string(),
        LooseSlotId::Text(s) => format!("`{s}`"),
    }
}
