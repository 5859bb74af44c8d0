//! Implementation of the request handler in front of the store

use parking_slots_core::{FailureKind, Request, RequestHandler, RequestKind};
use tracing::error;

use crate::allocator::SlotAllocator;
use crate::command::{respond, Command};
use crate::worker::Worker;

enum Backend {
    Locked(SlotAllocator),
    Serial(Worker),
}

/// Serves browser requests from the slot store
///
/// ⚠️ This struct implements the [`RequestHandler`] trait and is what
/// [`launch`](crate::launch) hands to the HTTP server.
pub struct SlotService {
    backend: Backend,
}

impl SlotService {
    pub(crate) fn locked(allocator: SlotAllocator) -> Self {
        Self {
            backend: Backend::Locked(allocator),
        }
    }

    pub(crate) fn serial(worker: Worker) -> Self {
        Self {
            backend: Backend::Serial(worker),
        }
    }

    /// Whether requests are served by a single worker thread
    pub fn is_serial(&self) -> bool {
        matches!(self.backend, Backend::Serial(_))
    }

    fn active_reservations(&self) -> Option<usize> {
        match &self.backend {
            Backend::Locked(allocator) => Some(allocator.reservations().len()),
            Backend::Serial(worker) => worker.active_reservations(),
        }
    }
}

impl RequestHandler for SlotService {
    fn handle(&self, mut rq: Request) {
        if *rq.kind() == RequestKind::Debug {
            let mode = if self.is_serial() { "serial" } else { "locked" };
            let active = self
                .active_reservations()
                .map_or_else(|| "?".into(), |n| n.to_string());
            rq.respond_with_string(format!("🅿️ {mode} store, {active} active reservations"));
            return;
        }

        let command = match Command::decode(&mut rq) {
            Ok(command) => command,
            Err(err) => return respond(rq, Err(err)),
        };

        let outcome = match &self.backend {
            Backend::Locked(allocator) => allocator.apply(command),
            Backend::Serial(worker) => match worker.apply(command) {
                Some(outcome) => outcome,
                None => {
                    error!(request = %rq.id(), "slot worker is gone");
                    rq.respond_with_err(FailureKind::Conflict, "The reservation system is shutting down.");
                    return;
                }
            },
        };
        respond(rq, outcome);
    }

    fn shutdown(self) {
        match self.backend {
            Backend::Locked(_) => {}
            Backend::Serial(worker) => worker.shutdown(),
        }
    }
}
