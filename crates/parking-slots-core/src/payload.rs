use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live state of a slot
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum SlotState {
    /// Free to be reserved
    Available,
    /// Blocked permanently, never reservable
    Occupied,
    /// Held by an active reservation for the given window
    Reserved {
        /// Start of the reserved window
        from: DateTime<Utc>,
        /// End of the reserved window
        to: DateTime<Utc>,
    },
}

impl SlotState {
    /// Whether the slot is held by an active reservation
    #[inline]
    pub fn is_reserved(&self) -> bool {
        matches!(self, SlotState::Reserved { .. })
    }
}

/// A slot as seen by clients
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct SlotView {
    /// The slot's id
    pub id: u32,
    /// The slot's state at the time of listing
    pub status: SlotState,
}

/// Why a request could not be served
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FailureKind {
    /// Malformed or missing fields
    InvalidInput,
    /// Unknown slot or no matching reservation
    NotFound,
    /// The slot cannot be reserved right now
    Conflict,
}

impl FailureKind {
    /// HTTP status code the failure is reported with
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::InvalidInput => 400,
            FailureKind::NotFound => 404,
            FailureKind::Conflict => 409,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::InvalidInput => "invalid input",
            FailureKind::NotFound => "not found",
            FailureKind::Conflict => "conflict",
        })
    }
}

/// A slot id as sent by a browser, either a JSON number or a string
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum LooseSlotId {
    /// `"slotId": 4`
    Number(i64),
    /// `"slotId": 4.0`
    Float(f64),
    /// `"slotId": "4"`
    Text(String),
}

impl LooseSlotId {
    /// Whether the id carries no value at all (an empty string)
    pub fn is_blank(&self) -> bool {
        matches!(self, LooseSlotId::Text(s) if s.trim().is_empty())
    }

    /// Coerce into a slot id
    ///
    /// Strings are read up to the first non-digit, so `"4"` and `"4th"` both
    /// yield 4, and fractions are cut off. Returns [`None`] if no positive
    /// integer can be read.
    pub fn coerce(&self) -> Option<u32> {
        let id = match self {
            LooseSlotId::Number(n) => u32::try_from(*n).ok()?,
            LooseSlotId::Float(n) => {
                let n = n.trunc();
                if !(0.0..=f64::from(u32::MAX)).contains(&n) {
                    return None;
                }
                n as u32
            }
            LooseSlotId::Text(s) => {
                let s = s.trim_start();
                let s = s.strip_prefix('+').unwrap_or(s);
                let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
                s[..end].parse().ok()?
            }
        };
        (id != 0).then_some(id)
    }
}

/// Payload of a reservation request
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveForm {
    /// Slot to reserve
    pub slot_id: Option<LooseSlotId>,
    /// Contact of the holder
    pub contact: Option<String>,
    /// Start of the window, RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]`
    pub start_time: Option<String>,
    /// End of the window, RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]`
    pub end_time: Option<String>,
}

/// Payload of a cancellation request
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelForm {
    /// Contact the reservation was made with
    pub contact: Option<String>,
    /// Restrict the cancellation to this slot
    pub slot_id: Option<LooseSlotId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ids_coerce_like_browsers_send_them() {
        assert_eq!(LooseSlotId::Number(4).coerce(), Some(4));
        assert_eq!(LooseSlotId::Text("4".into()).coerce(), Some(4));
        assert_eq!(LooseSlotId::Text(" 12abc".into()).coerce(), Some(12));
        assert_eq!(LooseSlotId::Text("abc".into()).coerce(), None);
        assert_eq!(LooseSlotId::Number(-1).coerce(), None);
        assert_eq!(LooseSlotId::Number(0).coerce(), None);
        assert_eq!(LooseSlotId::Float(2.0).coerce(), Some(2));
        assert_eq!(LooseSlotId::Float(2.7).coerce(), Some(2));
        assert_eq!(LooseSlotId::Float(0.5).coerce(), None);
        assert_eq!(LooseSlotId::Float(f64::NAN).coerce(), None);
        assert_eq!(LooseSlotId::Float(1e12).coerce(), None);
        assert!(LooseSlotId::Text("  ".into()).is_blank());
    }

    #[test]
    fn forms_accept_camel_case_and_missing_fields() {
        let form: ReserveForm =
            serde_json::from_str(r#"{"slotId":"2","contact":"555","startTime":"2024-12-28T12:00"}"#)
                .unwrap();
        assert_eq!(form.slot_id, Some(LooseSlotId::Text("2".into())));
        assert_eq!(form.contact.as_deref(), Some("555"));
        assert!(form.end_time.is_none());

        let form: CancelForm = serde_json::from_str(r#"{"contact":"555"}"#).unwrap();
        assert!(form.slot_id.is_none());

        let form: CancelForm = serde_json::from_str(r#"{"contact":"555","slotId":2.0}"#).unwrap();
        assert_eq!(form.slot_id.and_then(|id| id.coerce()), Some(2));

        assert!(serde_json::from_str::<CancelForm>(r#"{"contact":555}"#).is_err());
    }
}
