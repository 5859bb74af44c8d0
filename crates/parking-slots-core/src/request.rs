use std::io;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{FailureKind, SlotView};

/// Kind of the request
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// List all slots with their live status
    ListSlots,

    /// Reserve a slot for a time window
    ///
    /// The payload is a JSON [`ReserveForm`](crate::ReserveForm).
    Reserve,

    /// Cancel a reservation by contact and optional slot id
    ///
    /// The payload is a JSON [`CancelForm`](crate::CancelForm).
    Cancel,

    /// Useful for sending information for debugging
    Debug,
}

/// Request sent from a web browser
pub struct Request {
    kind: RequestKind,
    id: Uuid,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// Interface for handling requests from a web browser
pub trait RequestHandler {
    /// Handle a request from a web browser
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the reservation system down
    ///
    /// This method waits for all threads spawned for the reservation system to
    /// have terminated.
    fn shutdown(self);
}

/// A raw request, implemented by the HTTP server and the test harness
pub trait RawRequest {
    /// Read the request body as bytes
    fn read_bytes(&mut self) -> io::Result<Vec<u8>>;

    /// Respond with an error message
    fn respond_with_err(self: Box<Self>, kind: FailureKind, msg: String, id: Uuid);
    /// Respond with the list of slots
    fn respond_with_slots(self: Box<Self>, slots: &[SlotView], id: Uuid);
    /// Respond with a successful reservation or cancellation
    fn respond_with_success(self: Box<Self>, slot_id: u32, msg: String, id: Uuid);
    /// Respond with a string
    fn respond_with_string(self: Box<Self>, s: String, id: Uuid);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the id assigned to this request for logging
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Read the payload as JSON
    ///
    /// Returns [`Err`] if the browser did not send valid JSON of the expected
    /// shape or some communication error happened. An empty body is read as
    /// `{}`.
    ///
    /// 📌 This method has side effects and should be called only once per
    /// request.
    pub fn read_json<T: DeserializeOwned>(&mut self) -> serde_json::Result<T> {
        let bytes = self.raw.read_bytes().map_err(serde_json::Error::io)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_slice(b"{}");
        }
        serde_json::from_slice(&bytes)
    }

    /// Respond with an error of the given kind
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, kind: FailureKind, msg: impl Into<String>) {
        self.raw.respond_with_err(kind, msg.into(), self.id);
    }

    /// Respond with the list of slots
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_slots(self, slots: &[SlotView]) {
        self.raw.respond_with_slots(slots, self.id);
    }

    /// Respond with the slot a reservation or cancellation succeeded for
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_success(self, slot_id: u32, msg: impl Into<String>) {
        self.raw.respond_with_success(slot_id, msg.into(), self.id);
    }

    /// Respond with an arbitrary string
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_string(self, s: impl Into<String>) {
        self.raw.respond_with_string(s.into(), self.id);
    }

    /// Create a new request from a [`RawRequest`]
    #[inline]
    pub fn from_raw(kind: RequestKind, id: Uuid, raw: Box<dyn RawRequest + Send>) -> Self {
        Self { kind, id, raw }
    }
}
