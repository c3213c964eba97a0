//! Exact duplicate detection.
//!
//! Each non-null, non-empty geometry is encoded with [`crate::canonical::encode`].
//! Encodings are bucketed by FxHash and confirmed byte-for-byte, so a hash
//! collision never merges two distinct geometries.
//!
//! # Counting
//!
//! For an equality class of size `k`, `k - 1` features are duplicates (every
//! occurrence after the first). `duplicate_indices` lists every member of every
//! class of size ≥ 2, first occurrence included, in store order.

use crate::canonical;
use crate::geometry::{FeatureIndex, GeometryStore};
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Result of the duplicate check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub duplicate_count: usize,
    pub duplicate_indices: Vec<FeatureIndex>,
}

/// One equality class: the shared encoding and the store positions holding it.
struct EqualityClass {
    bytes: Vec<u8>,
    positions: Vec<usize>,
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Find features whose geometries are byte-identical under canonical encoding.
pub fn check_duplicates(store: &GeometryStore) -> DuplicateReport {
    let mut classes: Vec<EqualityClass> = Vec::new();
    // hash → class ids sharing that hash
    let mut buckets: FxHashMap<u64, Vec<usize>> = FxHashMap::default();

    for (pos, feature) in store.iter().enumerate() {
        let Some(geom) = feature.shape() else {
            continue;
        };
        let bytes = match canonical::encode(geom) {
            Ok(b) => b,
            Err(fault) => {
                tracing::debug!(
                    index = feature.index,
                    error = %fault,
                    "Canonical encoding faulted; excluded from duplicate check"
                );
                continue;
            }
        };

        let bucket = buckets.entry(hash_bytes(&bytes)).or_default();
        let existing = bucket.iter().copied().find(|&id| classes[id].bytes == bytes);
        match existing {
            Some(id) => classes[id].positions.push(pos),
            None => {
                bucket.push(classes.len());
                classes.push(EqualityClass {
                    bytes,
                    positions: vec![pos],
                });
            }
        }
    }

    let mut duplicate_count = 0;
    let mut positions: Vec<usize> = Vec::new();
    for class in classes.iter().filter(|c| c.positions.len() >= 2) {
        duplicate_count += class.positions.len() - 1;
        positions.extend_from_slice(&class.positions);
    }
    positions.sort_unstable();

    let features = store.features();
    DuplicateReport {
        duplicate_count,
        duplicate_indices: positions.into_iter().map(|p| features[p].index).collect(),
    }
}
