//! Parallel executor and heap merger.
//!
//! Runs every resolved `Configuration` independently across a `rayon`
//! thread pool, then merges their per-configuration top-K lists into
//! one final top-K, deduplicating `(l_idx, r_idx)` pairs produced by
//! more than one configuration by keeping the highest similarity seen.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::candidates::CandidateIndex;
use crate::configs::Configuration;
use crate::error::Result;
use crate::join::{join_configuration, SimKey};
use crate::store::RecordStore;

/// Builds a scoped `rayon` pool with `workers` threads and evaluates
/// `configs` across it, taking the first `n_configs` of them (already
/// resolved by [`crate::configs::resolve_config_count`]).
///
/// The merge step is a plain fold over per-configuration results, not
/// itself parallelized: with at most a few dozen configurations and a
/// bounded K per configuration, it is cheap next to the join itself,
/// and doing it single-threaded keeps output order a pure function of
/// the data regardless of how the fold is scheduled.
pub fn run(
    l_store: &RecordStore,
    r_store: &RecordStore,
    configs: &[Configuration],
    candidates: &CandidateIndex,
    workers: usize,
    n_configs: usize,
    output_size: usize,
) -> Result<Vec<SimKey>> {
    let configs = &configs[..n_configs.min(configs.len())];

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| crate::error::Error::InvalidInput(e.to_string()))?;

    let per_config: Vec<Vec<SimKey>> = pool.install(|| {
        configs
            .par_iter()
            .map(|config| join_configuration(l_store, r_store, config, candidates, output_size))
            .collect()
    });

    Ok(merge(per_config, output_size))
}

/// Deduplicates on `(l_idx, r_idx)` keeping the highest similarity,
/// then sorts descending by similarity with ascending index tie-break
/// (the same ordering `SimKey`'s `Ord` already encodes) and truncates
/// to `output_size`.
fn merge(per_config: Vec<Vec<SimKey>>, output_size: usize) -> Vec<SimKey> {
    let mut best: HashMap<(u32, u32), SimKey> = HashMap::new();

    for results in per_config {
        for key in results {
            best.entry((key.l_idx, key.r_idx))
                .and_modify(|existing| {
                    if key.sim > existing.sim {
                        *existing = key;
                    }
                })
                .or_insert(key);
        }
    }

    let mut merged: Vec<SimKey> = best.into_values().collect();
    merged.sort_unstable_by(|a, b| b.cmp(a));
    merged.truncate(output_size);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates_keeping_highest_similarity() {
        let per_config = vec![
            vec![SimKey {
                sim: 0.5,
                l_idx: 0,
                r_idx: 0,
            }],
            vec![SimKey {
                sim: 0.9,
                l_idx: 0,
                r_idx: 0,
            }],
        ];

        let merged = merge(per_config, 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].sim, 0.9);
    }

    #[test]
    fn merge_truncates_to_output_size() {
        let per_config = vec![vec![
            SimKey {
                sim: 0.9,
                l_idx: 0,
                r_idx: 0,
            },
            SimKey {
                sim: 0.8,
                l_idx: 0,
                r_idx: 1,
            },
            SimKey {
                sim: 0.7,
                l_idx: 0,
                r_idx: 2,
            },
        ]];

        let merged = merge(per_config, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].sim, 0.9);
        assert_eq!(merged[1].sim, 0.8);
    }

    #[test]
    fn merge_breaks_ties_by_ascending_indices() {
        let per_config = vec![vec![
            SimKey {
                sim: 0.5,
                l_idx: 2,
                r_idx: 0,
            },
            SimKey {
                sim: 0.5,
                l_idx: 1,
                r_idx: 0,
            },
        ]];

        let merged = merge(per_config, 10);
        assert_eq!(merged[0].l_idx, 1);
        assert_eq!(merged[1].l_idx, 2);
    }
}
