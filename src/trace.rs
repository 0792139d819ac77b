use tracing::dispatcher::{set_global_default, Dispatch};
use tracing_subscriber::FmtSubscriber;

/// Installs the global `tracing` subscriber.
///
/// `levels` is an env-filter directive such as `info` or
/// `remote_write_shipper=debug,hyper=warn`. Calling this more than once keeps the
/// first subscriber.
pub fn init(color: bool, json: bool, levels: &str) {
    let dispatch = if json {
        let formatter = FmtSubscriber::builder()
            .with_env_filter(levels)
            .json()
            .flatten_event(true)
            .finish();

        Dispatch::new(formatter)
    } else {
        let formatter = FmtSubscriber::builder()
            .with_ansi(color)
            .with_env_filter(levels)
            .finish();

        Dispatch::new(formatter)
    };

    // Fails only when a subscriber is already installed.
    let _ = set_global_default(dispatch);
}
