//! 🏗 Infrastructure for handling requests, wire payloads and launch configuration
#![warn(missing_docs)]

mod config;
mod payload;
mod request;

pub use config::{Config, ReservationSeed, SlotSeed};
pub use payload::{CancelForm, FailureKind, LooseSlotId, ReserveForm, SlotState, SlotView};
pub use request::{RawRequest, Request, RequestHandler, RequestKind};
