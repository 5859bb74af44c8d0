//! Mock API implementation directly using the `parking-slots-allocator` crate

use std::sync::Arc;

use eyre::Result;
use parking_slots_allocator::{ManualClock, SlotService};
use parking_slots_core::{FailureKind, RawRequest, Request, RequestHandler, SlotView};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use uuid::Uuid;

use super::{Api, RequestMsg, Response};

pub struct MockService {
    service: Arc<SlotService>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    payload: Option<Vec<u8>>,
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(
    threads: u16,
    config: parking_slots_core::Config,
    clock: Arc<ManualClock>,
) -> Result<(MockService, Api)> {
    let service = Arc::new(
        task::spawn_blocking(move || parking_slots_allocator::launch(&config, clock)).await??,
    );

    let it = (0..threads).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let service = service.clone();
        let handle = task::spawn_blocking(move || {
            let service = &*service;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    payload: msg.payload,
                    response_channel: msg.response_channel,
                });
                service.handle(Request::from_raw(msg.kind, msg.id, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_service = MockService {
        service,
        join_handles,
    };
    Ok((mock_service, Api::new(senders)))
}

impl MockService {
    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        task::spawn_blocking(move || Arc::into_inner(self.service).unwrap().shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.payload.take().unwrap_or_default())
    }

    fn respond_with_err(self: Box<Self>, kind: FailureKind, msg: String, _id: Uuid) {
        self.response_channel
            .send(Response::Error { kind, msg })
            .unwrap()
    }

    fn respond_with_slots(self: Box<Self>, slots: &[SlotView], _id: Uuid) {
        self.response_channel
            .send(Response::Slots(slots.to_vec()))
            .unwrap()
    }

    fn respond_with_success(self: Box<Self>, slot_id: u32, msg: String, _id: Uuid) {
        self.response_channel
            .send(Response::Success { slot_id, msg })
            .unwrap()
    }

    fn respond_with_string(self: Box<Self>, s: String, _id: Uuid) {
        self.response_channel.send(Response::Text(s)).unwrap()
    }
}
