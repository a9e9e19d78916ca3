pub mod reconciler;

pub use reconciler::{IngestStats, Reconciler};
