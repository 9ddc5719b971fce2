#![doc(test(attr(deny(warnings))))]

//! Lab Intake collects lab setup requests through a multi-step terminal
//! wizard and stores each finished response as a JSON document.

pub mod cli;
pub mod config;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes tracing, preferring `directive` over the default filter.
pub fn init_with_filter(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("lab_intake tracing initialized");
    });
}
