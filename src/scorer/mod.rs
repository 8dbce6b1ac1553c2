pub mod community;
pub mod enricher;
pub mod functions;

pub use community::community_metrics;
pub use enricher::{enrich, enrich_batch};
