//! The prefix-filtered top-K inner loop, evaluated once per
//! configuration. Each call walks the whole `L x R` space without
//! ever materializing the cross product, using the candidate index to
//! skip pairs the upstream blocker already proposed and a
//! rarity-ranked inverted index to skip pairs that share no token.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::candidates::CandidateIndex;
use crate::collections::FixedReverseHeap;
use crate::configs::Configuration;
use crate::store::RecordStore;

/// One surviving pair, ordered so that `FixedReverseHeap::into_sorted_vec`
/// hands back exactly the order the final output wants: descending
/// similarity, ties broken by ascending `l_idx` then ascending `r_idx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimKey {
    pub sim: f64,
    pub l_idx: u32,
    pub r_idx: u32,
}

impl Eq for SimKey {}

impl PartialOrd for SimKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sim
            .partial_cmp(&other.sim)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.l_idx.cmp(&self.l_idx))
            .then_with(|| other.r_idx.cmp(&self.r_idx))
    }
}

/// A record's view under one configuration: the subsequence of its
/// (globally rarity-ranked, ascending) tokens that survive the field
/// mask and per-field budget, still in ascending rank order.
pub fn signature(store: &RecordStore, record: usize, config: &Configuration) -> Vec<u32> {
    let tokens = &store.tokens[record];
    let fields = &store.fields[record];

    let mut taken = vec![0usize; config.num_fields()];
    let mut sig = Vec::new();

    for (i, &tok) in tokens.iter().enumerate() {
        let field = fields[i] as usize;

        if !config.mask[field] {
            continue;
        }

        if taken[field] >= config.budget[field] {
            continue;
        }

        taken[field] += 1;
        sig.push(tok);
    }

    sig
}

/// Counts shared ranks between two ascending, duplicate-free rank
/// sequences in O(|a| + |b|).
fn merge_intersection_count(a: &[u32], b: &[u32]) -> usize {
    let (mut i, mut j) = (0, 0);
    let mut count = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }

    count
}

/// Evaluates one configuration over the full `L x R` space and
/// returns its own top-`k` pairs, already in final output order.
///
/// Pairs already present in `candidates` (the upstream blocker's
/// output) are never scored, matching the "discarded by the blocker"
/// scope of the whole tool. Jaccard similarity over the truncated
/// signatures is used throughout.
pub fn join_configuration(
    l_store: &RecordStore,
    r_store: &RecordStore,
    config: &Configuration,
    candidates: &CandidateIndex,
    k: usize,
) -> Vec<SimKey> {
    let mut index: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut r_sigs: Vec<Vec<u32>> = Vec::with_capacity(r_store.len());

    for r in 0..r_store.len() {
        let sig = signature(r_store, r, config);
        for &tok in &sig {
            index.entry(tok).or_default().push(r as u32);
        }
        r_sigs.push(sig);
    }

    let mut heap: FixedReverseHeap<SimKey> = FixedReverseHeap::with_capacity(k);

    for l in 0..l_store.len() {
        let l_sig = signature(l_store, l, config);
        if l_sig.is_empty() {
            continue;
        }

        let mut visited: HashSet<u32> = HashSet::new();

        for &tok in &l_sig {
            let Some(candidates_for_tok) = index.get(&tok) else {
                continue;
            };

            for &r in candidates_for_tok {
                if !visited.insert(r) {
                    continue;
                }

                if candidates.contains(l as u32, r) {
                    continue;
                }

                let r_sig = &r_sigs[r as usize];

                if let Some(floor) = heap.floor() {
                    let min_len = l_sig.len().min(r_sig.len()) as f64;
                    let max_len = l_sig.len().max(r_sig.len()) as f64;
                    let upper_bound = min_len / max_len;

                    if upper_bound <= floor.sim {
                        continue;
                    }
                }

                let inter = merge_intersection_count(&l_sig, r_sig);
                if inter == 0 {
                    continue;
                }

                let union = l_sig.len() + r_sig.len() - inter;
                let sim = inter as f64 / union as f64;

                heap.push(SimKey {
                    sim,
                    l_idx: l as u32,
                    r_idx: r,
                });
            }
        }
    }

    heap.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::TokenOccurrence;
    use crate::vocab::build_token_order;

    fn store_pair(
        l: Vec<Vec<TokenOccurrence>>,
        r: Vec<Vec<TokenOccurrence>>,
    ) -> (RecordStore, RecordStore) {
        let order = build_token_order(&l, &r);
        (RecordStore::build(&l, &order), RecordStore::build(&r, &order))
    }

    #[test]
    fn signature_respects_mask_and_budget() {
        let (l, _) = store_pair(
            vec![vec![
                ("rare".to_owned(), 0),
                ("common".to_owned(), 0),
                ("other".to_owned(), 1),
            ]],
            vec![vec![("common".to_owned(), 0)]],
        );

        let config = Configuration {
            mask: vec![true, false],
            budget: vec![1, 5],
        };

        let sig = signature(&l, 0, &config);
        assert_eq!(sig.len(), 1);
    }

    #[test]
    fn identical_records_score_similarity_one() {
        let (l, r) = store_pair(
            vec![vec![("john".to_owned(), 0), ("smith".to_owned(), 0)]],
            vec![vec![("john".to_owned(), 0), ("smith".to_owned(), 0)]],
        );

        let config = Configuration {
            mask: vec![true],
            budget: vec![10],
        };

        let candidates = CandidateIndex::default();
        let results = join_configuration(&l, &r, &config, &candidates, 5);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sim, 1.0);
    }

    #[test]
    fn candidate_pairs_are_excluded() {
        let (l, r) = store_pair(
            vec![vec![("john".to_owned(), 0)]],
            vec![vec![("john".to_owned(), 0)]],
        );

        let config = Configuration {
            mask: vec![true],
            budget: vec![10],
        };

        let mut l_index = HashMap::new();
        l_index.insert("L1".to_owned(), 0u32);
        let mut r_index = HashMap::new();
        r_index.insert("R1".to_owned(), 0u32);

        let candidates = CandidateIndex::build(
            &[("L1".to_owned(), "R1".to_owned())],
            &l_index,
            &r_index,
        );

        let results = join_configuration(&l, &r, &config, &candidates, 5);
        assert!(results.is_empty());
    }

    #[test]
    fn disjoint_records_produce_no_match() {
        let (l, r) = store_pair(
            vec![vec![("alpha".to_owned(), 0)]],
            vec![vec![("beta".to_owned(), 0)]],
        );

        let config = Configuration {
            mask: vec![true],
            budget: vec![10],
        };

        let candidates = CandidateIndex::default();
        let results = join_configuration(&l, &r, &config, &candidates, 5);
        assert!(results.is_empty());
    }

    #[test]
    fn results_are_capped_at_k_and_sorted_descending() {
        let l = vec![vec![("shared".to_owned(), 0)]];
        let r = vec![
            vec![("shared".to_owned(), 0), ("a".to_owned(), 0)],
            vec![("shared".to_owned(), 0), ("a".to_owned(), 0), ("b".to_owned(), 0)],
            vec![
                ("shared".to_owned(), 0),
                ("a".to_owned(), 0),
                ("b".to_owned(), 0),
                ("c".to_owned(), 0),
            ],
        ];

        let (l_store, r_store) = store_pair(l, r);

        let config = Configuration {
            mask: vec![true],
            budget: vec![10],
        };

        let candidates = CandidateIndex::default();
        let results = join_configuration(&l_store, &r_store, &config, &candidates, 2);

        assert_eq!(results.len(), 2);
        assert!(results[0].sim >= results[1].sim);
    }
}
