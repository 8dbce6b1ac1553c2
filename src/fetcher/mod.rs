pub mod listings;
pub mod social;

pub use listings::{fetch_listings, listings_client};
pub use social::{ProviderBatch, SocialFetcher};
