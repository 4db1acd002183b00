mod api_docs;

pub use api_docs::{ApiEndpoint, ApiParameter, DiscoveryResult, EndpointSet};
