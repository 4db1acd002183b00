use super::response::RawEndpoint;
use crate::models::{ApiEndpoint, EndpointSet};

/// Folds one round of model output into the accumulated set.
///
/// Returns the number of endpoints whose (method, path) key was not seen before.
pub fn merge_round(accumulated: &mut EndpointSet, incoming: Vec<RawEndpoint>) -> usize {
    merge_endpoints(
        accumulated,
        incoming.into_iter().filter_map(RawEndpoint::into_endpoint),
    )
}

pub fn merge_endpoints<I>(accumulated: &mut EndpointSet, incoming: I) -> usize
where
    I: IntoIterator<Item = ApiEndpoint>,
{
    let mut added = 0;
    for endpoint in incoming {
        if accumulated.insert(endpoint) {
            added += 1;
        }
    }
    added
}
