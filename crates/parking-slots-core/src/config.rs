use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Configuration of the slot reservation system
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Slots known to the system, in listing order
    #[serde(default)]
    pub slots: Vec<SlotSeed>,
    /// Reservations present at launch
    #[serde(default)]
    pub reservations: Vec<ReservationSeed>,

    /// Serve all requests from a single worker thread owning the store
    /// instead of locking it
    #[serde(default)]
    pub serial: bool,
}

/// A slot present at launch
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlotSeed {
    /// Positive, unique slot id
    pub id: u32,
    /// Whether the slot is permanently blocked
    #[serde(default)]
    pub occupied: bool,
}

/// A reservation present at launch
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReservationSeed {
    /// Slot the reservation holds
    pub slot_id: u32,
    /// Contact of the holder
    pub contact: String,
    /// Start of the reserved window
    pub start_time: DateTime<Utc>,
    /// End of the reserved window
    pub end_time: DateTime<Utc>,
}

impl Config {
    /// Configuration with the given slots, all available, and no reservations
    pub fn with_available_slots(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            slots: ids
                .into_iter()
                .map(|id| SlotSeed {
                    id,
                    occupied: false,
                })
                .collect(),
            reservations: Vec::new(),
            serial: false,
        }
    }
}

impl Default for Config {
    /// The demo lot: six slots, two of them blocked, and two reservations
    /// from the past which lapse on the first request.
    fn default() -> Self {
        let at = |h, m| Utc.with_ymd_and_hms(2024, 12, 28, h, m, 0).unwrap();
        Self {
            slots: [1, 2, 3, 4, 5, 6]
                .into_iter()
                .map(|id| SlotSeed {
                    id,
                    occupied: id == 3 || id == 6,
                })
                .collect(),
            reservations: vec![
                ReservationSeed {
                    slot_id: 1,
                    contact: "1234567890".into(),
                    start_time: at(21, 33),
                    end_time: at(21, 35),
                },
                ReservationSeed {
                    slot_id: 4,
                    contact: "9876543210".into(),
                    start_time: at(12, 0),
                    end_time: at(14, 0),
                },
            ],
            serial: false,
        }
    }
}
