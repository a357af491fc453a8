//! Basic logger usage example
//!
//! Demonstrates console logging, level filtering and the logging macros.
//!
//! Run with: cargo run --example basic_usage

use rust_log_pipeline::prelude::*;
use rust_log_pipeline::{debug, error, info, warning};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Basic Usage Example ===\n");

    let console = Arc::new(ConsoleProcessor::new());

    // Build a logger that shows everything
    let builder = Logger::builder()
        .add_log_processor(console.clone())
        .set_minimum_level(LogLevel::Debug);
    let logger = builder.build()?;

    println!("1. Logging at different levels:");
    logger.debug("Demo", "This is a debug message")?;
    logger.information("Demo", "This is an information message")?;
    logger.warning("Demo", "This is a warning message")?;
    logger.error("Demo", "This is an error message")?;

    println!("\n2. Logging with format arguments:");
    let port = 8080;
    info!(logger, "Server", "listening on port {}", port)?;
    debug!(logger, "Server", "{} worker threads", 4)?;

    println!("\n3. A second logger from the same builder with a higher minimum:");
    let quiet = builder.set_minimum_level(LogLevel::Warning).build()?;
    info!(quiet, "Quiet", "Information message (hidden)")?;
    warning!(quiet, "Quiet", "Warning message (visible)")?;
    error!(quiet, "Quiet", "Error code: {}", 500)?;

    logger.dispose()?;
    quiet.dispose()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
