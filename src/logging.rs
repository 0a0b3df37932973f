use std::any::Any;
use std::panic::Location;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::adapt::pipeline::panic_message;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "user_unifier=info";

/// Installs a console `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Routes panic reports through `tracing` instead of the default stderr
/// hook.
///
/// Adapter panics are caught and recorded per record by the pipeline, but the
/// process hook still sees each one first.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(
            target: "user_unifier::panic",
            "Panic: {}",
            describe_panic(info.payload(), info.location())
        );
    }));
}

fn describe_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = panic_message(payload);
    match location {
        Some(location) => format!("{} at {}:{}", message, location.file(), location.line()),
        None => message,
    }
}
