//! A single thread owning the slot store
//!
//! Instead of locking, the [`Worker`] serializes operations by queueing them on
//! a channel and applying them one at a time on its own thread. Replies travel
//! back on a per-command channel so that the store's owner never waits on a
//! browser.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, unbounded, Sender};
use tracing::debug;

use crate::clock::Clock;
use crate::command::{Command, Reply};
use crate::error::AllocResult;
use crate::store::SlotBook;

pub(crate) enum WorkerRequest {
    Apply {
        command: Command,
        reply: Sender<AllocResult<Reply>>,
    },
    ActiveReservations {
        reply: Sender<usize>,
    },
    Shutdown,
}

pub(crate) struct Worker {
    sender: Sender<WorkerRequest>,
    thread: JoinHandle<()>,
}

impl Worker {
    /// Spawn the worker thread, handing it `book`
    pub fn spawn(mut book: SlotBook, clock: Arc<dyn Clock>) -> Self {
        let (sender, receiver) = unbounded();
        let thread = thread::Builder::new()
            .name("slot_worker".into())
            .spawn(move || {
                for request in receiver {
                    match request {
                        WorkerRequest::Apply { command, reply } => {
                            let _ = reply.send(command.apply(&mut book, clock.now()));
                        }
                        WorkerRequest::ActiveReservations { reply } => {
                            book.expire(clock.now());
                            let _ = reply.send(book.reservations().len());
                        }
                        WorkerRequest::Shutdown => break,
                    }
                }
                debug!("slot worker stopped");
            })
            .expect("spawning the slot worker failed");
        Self { sender, thread }
    }

    /// Queue `command` and wait for its outcome
    ///
    /// Returns [`None`] if the worker has already stopped.
    pub fn apply(&self, command: Command) -> Option<AllocResult<Reply>> {
        let (reply, outcome) = bounded(1);
        self.sender
            .send(WorkerRequest::Apply { command, reply })
            .ok()?;
        outcome.recv().ok()
    }

    pub fn active_reservations(&self) -> Option<usize> {
        let (reply, outcome) = bounded(1);
        self.sender
            .send(WorkerRequest::ActiveReservations { reply })
            .ok()?;
        outcome.recv().ok()
    }

    /// Stop the worker after it has drained the commands queued so far
    pub fn shutdown(self) {
        let _ = self.sender.send(WorkerRequest::Shutdown);
        self.thread.join().unwrap();
    }
}
