// crates/conformance-cli/src/telemetry.rs
// ============================================================================
// Module: Telemetry Setup
// Description: Installs the tracing subscriber for CLI runs.
// Purpose: Route diagnostic events to stderr so reports own stdout.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs the process-wide `tracing` subscriber. Events go to stderr so a
//! report written to stdout stays machine-readable. The filter is read from
//! `CONFORMANCE_LOG` using `EnvFilter` directive syntax.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;

use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Subscriber
// ============================================================================

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "CONFORMANCE_LOG";
/// Filter used when the environment does not set one.
const DEFAULT_FILTER: &str = "warn";

/// Installs a global subscriber writing to stderr.
///
/// Returns false when a subscriber was already installed.
pub fn init_tracing(json: bool) -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);
    if json { builder.json().try_init().is_ok() } else { builder.try_init().is_ok() }
}
