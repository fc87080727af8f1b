use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::UtcDateTime;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level; nested dispatches render as an indented call tree.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let tree = HierarchicalLayer::default()
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_targets(true)
        .with_bracketed_fields(true)
        .with_timer(UtcDateTime::default());

    // Ignore the error from a second initialization (tests, embedding).
    _ = Registry::default().with(filter).with(tree).try_init();
}
