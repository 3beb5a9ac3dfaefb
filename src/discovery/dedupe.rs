//! Order-preserving deduplication of advertised node addresses

use crate::models::NodeAddress;
use std::collections::HashSet;

/// Drop repeated addresses, keeping the first occurrence of each.
pub fn dedupe(addresses: Vec<NodeAddress>) -> Vec<NodeAddress> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses
        .into_iter()
        .filter(|address| seen.insert(address.clone()))
        .collect()
}
