//! # File Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, elige el logger y arranca el servidor.

use anyhow::Context;
use file_server::config::Config;
use file_server::logger::{self, Logger, NoopLogger, TracingLogger};
use file_server::server::Server;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let config = Config::new();
    config.validate().context("Invalid configuration")?;

    let logger: Arc<dyn Logger> = if config.logging {
        logger::init_tracing();
        Arc::new(TracingLogger)
    } else {
        Arc::new(NoopLogger)
    };

    config.log_summary(logger.as_ref());

    let address = config.address();
    let server = Server::bind(config, logger)
        .with_context(|| format!("Cannot listen on {}", address))?;

    server.run()
}
