//! 🏗 HTTP request implementation

use std::io;
use std::io::{Cursor, Read};

use chrono::{DateTime, Utc};
use parking_slots_core::{FailureKind, RequestKind, SlotState, SlotView};
use serde::Serialize;
use tiny_http::{Header, Response};
use uuid::Uuid;

/// Rendering of reservation window bounds, e.g. `12/28/2024, 09:33 PM`
const WINDOW_FORMAT: &str = "%m/%d/%Y, %I:%M %p";

struct HTTPRequest(tiny_http::Request);

#[derive(Serialize)]
struct SlotBody {
    id: u32,
    status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot_id: Option<u32>,
    message: &'a str,
}

impl parking_slots_core::RawRequest for HTTPRequest {
    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn respond_with_err(self: Box<Self>, kind: FailureKind, msg: String, id: Uuid) {
        let body = OutcomeBody {
            success: false,
            slot_id: None,
            message: &msg,
        };
        self.respond_json(&body, kind.status_code(), id)
    }

    fn respond_with_slots(self: Box<Self>, slots: &[SlotView], id: Uuid) {
        let body: Vec<SlotBody> = slots
            .iter()
            .map(|slot| SlotBody {
                id: slot.id,
                status: status_label(&slot.status),
            })
            .collect();
        self.respond_json(&body, 200, id)
    }

    fn respond_with_success(self: Box<Self>, slot_id: u32, msg: String, id: Uuid) {
        let body = OutcomeBody {
            success: true,
            slot_id: Some(slot_id),
            message: &msg,
        };
        self.respond_json(&body, 200, id)
    }

    fn respond_with_string(self: Box<Self>, s: String, id: Uuid) {
        self.respond(Response::from_string(s).with_status_code(200), id)
    }
}

impl HTTPRequest {
    fn respond_json<T: Serialize>(self, body: &T, status: u16, id: Uuid) {
        let data = match serde_json::to_vec(body) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(request = %id, error = %err, "encoding response failed");
                return self.respond(Response::from_data(Vec::new()).with_status_code(500), id);
            }
        };
        let mut res = Response::from_data(data).with_status_code(status);
        res.add_header(Header::from_bytes(b"Content-Type", b"application/json").unwrap());
        self.respond(res, id)
    }

    /// Add HTTP headers (CORS, X-Request-Id) to `res` and send it
    fn respond<R: Read>(self, res: Response<R>, id: Uuid) {
        if let Err(err) = self.0.respond(stamp(res, id)) {
            tracing::warn!(request = %id, error = %err, "HTTP response failed");
        }
    }
}

/// Render a slot's state the way the booking page shows it
fn status_label(state: &SlotState) -> String {
    match state {
        SlotState::Available => "Available".into(),
        SlotState::Occupied => "Occupied".into(),
        SlotState::Reserved { from, to } => format!(
            "Reserved<br>From: {}<br>To: {}",
            format_bound(from),
            format_bound(to)
        ),
    }
}

fn format_bound(at: &DateTime<Utc>) -> String {
    at.format(WINDOW_FORMAT).to_string()
}

/// Where a request goes, judged by method and URL alone
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Route {
    Serve(RequestKind),
    /// CORS preflight
    Preflight,
    Unknown,
    MethodNotAllowed,
}

fn route(method: &tiny_http::Method, url: &str) -> Route {
    use tiny_http::Method::*;

    match (method, url) {
        (Options, _) => Route::Preflight,
        (Get, "/api/slots") => Route::Serve(RequestKind::ListSlots),
        (Post, "/api/reserve") => Route::Serve(RequestKind::Reserve),
        (Post, "/api/cancel") => Route::Serve(RequestKind::Cancel),
        (Get, url) | (Post, url) if url.starts_with("/api/debug") => {
            Route::Serve(RequestKind::Debug)
        }
        (Get, _) | (Post, _) => Route::Unknown,
        _ => Route::MethodNotAllowed,
    }
}

/// The answer to a request that never reaches the reservation system
fn rejection(route: Route) -> Option<Response<Cursor<Vec<u8>>>> {
    match route {
        Route::Serve(_) => None,
        Route::Preflight => Some(Response::from_data(Vec::new()).with_status_code(204)),
        Route::Unknown => Some(
            Response::from_string(
                "🦀 could not find the service you are looking for!

Valid requests are:
  GET  /api/slots
  POST /api/reserve
  POST /api/cancel
  GET  /api/debug(.*)
  POST /api/debug(.*)",
            )
            .with_status_code(404),
        ),
        Route::MethodNotAllowed => Some(Response::from_data(Vec::new()).with_status_code(405)),
    }
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered with a
/// corresponding error message.
pub fn parse(rq: tiny_http::Request) -> Option<parking_slots_core::Request> {
    let id = Uuid::new_v4();
    let target = route(rq.method(), rq.url());
    tracing::debug!(request = %id, route = ?target, url = rq.url(), "request received");

    let kind = match target {
        Route::Serve(kind) => kind,
        rejected => {
            if let Some(res) = rejection(rejected) {
                if let Err(err) = rq.respond(stamp(res, id)) {
                    tracing::warn!(request = %id, error = %err, "HTTP response failed");
                }
            }
            return None;
        }
    };

    Some(parking_slots_core::Request::from_raw(
        kind,
        id,
        Box::new(HTTPRequest(rq)),
    ))
}

/// Add CORS headers and the request id to `res`
fn stamp<R: Read>(mut res: Response<R>, id: Uuid) -> Response<R> {
    add_response_cors_headers(&mut res);
    let rid = id.hyphenated().to_string();
    res.add_header(Header::from_bytes(b"X-Request-Id", rid.as_bytes()).unwrap());
    res
}

/// Add CORS headers to `res`
fn add_response_cors_headers<R: Read>(res: &mut Response<R>) {
    res.add_header(Header::from_bytes(b"Access-Control-Request-Method", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Allow-Origin", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Allow-Headers", b"*").unwrap());
    res.add_header(Header::from_bytes(b"Access-Control-Expose-Headers", b"*").unwrap());
}
