pub mod coerce;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod slug;

pub use model::{CollabGraph, Edge, EdgeTask, Node, RunBundle, SummaryBlock, TaskItem, TaskList};
pub use normalize::normalize;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
