pub mod bundle;
pub mod run;

pub use bundle::{BundleStore, StoreError, TranscriptMeta};
pub use run::RunContext;
