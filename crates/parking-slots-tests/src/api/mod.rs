use std::sync::Arc;

use chrono::{DateTime, Utc};
use eyre::Result;
use flume::Sender;
use nanorand::Rng;
use parking_slots_core::{FailureKind, RequestKind, SlotState, SlotView};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Error {} ({kind}): {msg}", .kind.status_code())]
pub struct ApiError {
    pub kind: FailureKind,
    pub msg: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum Response {
    Error { kind: FailureKind, msg: String },
    Slots(Vec<SlotView>),
    Success { slot_id: u32, msg: String },
    Text(String),
}

/// A successful reservation or cancellation
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Outcome {
    pub slot_id: u32,
    pub message: String,
}

impl Response {
    fn into_outcome(self, rq_kind: RequestKind) -> ApiResult<Outcome> {
        match self {
            Response::Error { kind, msg } => Err(ApiError { kind, msg }),
            Response::Success { slot_id, msg } => Ok(Outcome {
                slot_id,
                message: msg,
            }),
            resp => panic!("{rq_kind:?} must not be answered by {resp:?}"),
        }
    }
}

struct RequestMsg {
    kind: RequestKind,
    payload: Option<Vec<u8>>,
    id: Uuid,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per handler thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

impl Api {
    async fn make_request(&self, kind: RequestKind, payload: Option<Vec<u8>>) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            payload,
            id: Uuid::new_v4(),
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    pub async fn list_slots(&self) -> Result<Vec<SlotView>> {
        let kind = RequestKind::ListSlots;
        Ok(match self.make_request(kind, None).await? {
            Response::Slots(slots) => slots,
            resp => panic!("{kind:?} must not be answered by {resp:?}"),
        })
    }

    /// Status of slot `id`, panicking if the slot is not listed
    pub async fn slot_status(&self, id: u32) -> Result<SlotState> {
        let slots = self.list_slots().await?;
        match slots.iter().find(|s| s.id == id) {
            Some(slot) => Ok(slot.status),
            None => panic!("slot {id} must be listed, got {slots:?}"),
        }
    }

    pub async fn reserve(
        &self,
        slot_id: u32,
        contact: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ApiResult<Outcome>> {
        self.reserve_raw(json!({
            "slotId": slot_id,
            "contact": contact,
            "startTime": start.to_rfc3339(),
            "endTime": end.to_rfc3339(),
        }))
        .await
    }

    /// Send an arbitrary JSON payload as reservation request
    pub async fn reserve_raw(&self, payload: Value) -> Result<ApiResult<Outcome>> {
        let kind = RequestKind::Reserve;
        let response = self.make_request(kind, Some(payload.to_string().into_bytes()));
        Ok(response.await?.into_outcome(kind))
    }

    pub async fn cancel(&self, contact: &str, slot_id: Option<u32>) -> Result<ApiResult<Outcome>> {
        let payload = match slot_id {
            Some(slot_id) => json!({ "contact": contact, "slotId": slot_id }),
            None => json!({ "contact": contact }),
        };
        self.cancel_raw(payload).await
    }

    /// Send an arbitrary JSON payload as cancellation request
    pub async fn cancel_raw(&self, payload: Value) -> Result<ApiResult<Outcome>> {
        let kind = RequestKind::Cancel;
        let response = self.make_request(kind, Some(payload.to_string().into_bytes()));
        Ok(response.await?.into_outcome(kind))
    }

    pub async fn debug(&self) -> Result<String> {
        let kind = RequestKind::Debug;
        Ok(match self.make_request(kind, None).await? {
            Response::Text(s) => s,
            resp => panic!("{kind:?} must not be answered by {resp:?}"),
        })
    }

    /// Create a session for a driver with a random phone number
    pub fn create_user_session(&self) -> UserSession<'_> {
        let mut rng = nanorand::tls_rng();
        let contact: String = (0..10)
            .map(|_| char::from(b'0' + rng.generate_range(0u8..10)))
            .collect();
        UserSession {
            api: self,
            contact,
            held: Vec::new(),
        }
    }
}

/// A driver reserving and canceling slots under one contact
pub struct UserSession<'a> {
    pub api: &'a Api,
    pub contact: String,
    /// Slots this session reserved and has not canceled, oldest first
    pub held: Vec<u32>,
}

impl<'a> UserSession<'a> {
    pub async fn reserve(
        &mut self,
        slot_id: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ApiResult<Outcome>> {
        let response = self.api.reserve(slot_id, &self.contact, start, end).await?;
        if let Ok(outcome) = &response {
            self.held.push(outcome.slot_id);
        }
        Ok(response)
    }

    pub async fn cancel(&mut self, slot_id: Option<u32>) -> Result<ApiResult<Outcome>> {
        let response = self.api.cancel(&self.contact, slot_id).await?;
        if let Ok(outcome) = &response {
            self.held.retain(|&id| id != outcome.slot_id);
        }
        Ok(response)
    }
}
