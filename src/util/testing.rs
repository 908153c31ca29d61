use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{AllocNode, AllocRule};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Node with `id` doubling as its name.
pub fn node(id: &str, rule: AllocRule) -> AllocNode {
    AllocNode::with_id(id, id, rule)
}

pub fn fixed(id: &str, value: f64) -> AllocNode {
    node(id, AllocRule::Fixed { value })
}

pub fn percent(id: &str, value: f64) -> AllocNode {
    node(id, AllocRule::Percentage { value })
}

pub fn rest(id: &str) -> AllocNode {
    node(id, AllocRule::Remainder)
}
