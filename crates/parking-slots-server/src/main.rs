//! Server implementation

#![warn(missing_docs)]

mod http;
mod settings;

use std::sync::Arc;
use std::thread;

use clap::Parser;
use eyre::{eyre, Result};
use parking_slots_allocator::SystemClock;
use parking_slots_core::RequestHandler;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Parser)]
#[command(about = "🅿️ Parking slot reservation server")]
struct Opts {
    /// Port for the HTTP server to listen on
    #[arg(long, env = "PARKING_PORT", default_value_t = 8585)]
    port: u16,
    /// Host for the HTTP server to listen on
    #[arg(long, env = "PARKING_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Number of threads accepting HTTP requests
    #[arg(long, env = "PARKING_HTTP_THREADS", default_value_t = 64)]
    http_threads: u32,

    /// TOML file listing slots and initial reservations
    #[arg(long, env = "PARKING_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Serve all requests from a single worker thread instead of a lock
    #[arg(long, env = "PARKING_SERIAL")]
    serial: bool,
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            Err(err) => {
                tracing::error!(error = %err, "HTTP receive failed");
                continue;
            }
        };
        if let Some(rq) = http::parse(rq) {
            handler.handle(rq);
        }
    }
}

fn init_logger() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn main() -> Result<()> {
    init_logger()?;
    let opts = Opts::parse();

    let mut config = settings::load(opts.config.as_deref())?;
    config.serial |= opts.serial;

    let server = tiny_http::Server::http((opts.host.as_str(), opts.port))
        .map_err(|err| eyre!("binding {}:{} failed: {err}", opts.host, opts.port))?;
    tracing::info!(host = %opts.host, port = opts.port, "listening");

    let service = parking_slots_allocator::launch(&config, Arc::new(SystemClock))?;

    thread::scope(|s| -> Result<()> {
        for i in 0..opts.http_threads {
            thread::Builder::new()
                .name(format!("http_{i}"))
                .spawn_scoped(s, || http_loop(&server, &service))?;
        }
        Ok(())
    })
}
