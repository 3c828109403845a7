//! Candidate-set index: left record index -> set of right record
//! indices already proposed by the upstream blocker.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::table::Table;

#[derive(Debug, Default)]
pub struct CandidateIndex {
    excl: HashMap<u32, HashSet<u32>>,
}

impl CandidateIndex {
    pub fn contains(&self, l: u32, r: u32) -> bool {
        self.excl.get(&l).map(|set| set.contains(&r)).unwrap_or(false)
    }

    /// Builds the exclusion index from raw `(fk_l, fk_r)` key pairs.
    /// Pairs whose keys are absent from either index map are silently
    /// dropped.
    pub fn build(
        pairs: &[(String, String)],
        l_index: &HashMap<String, u32>,
        r_index: &HashMap<String, u32>,
    ) -> Self {
        let mut excl: HashMap<u32, HashSet<u32>> = HashMap::new();

        for (lk, rk) in pairs {
            if let (Some(&li), Some(&ri)) = (l_index.get(lk), r_index.get(rk)) {
                excl.entry(li).or_default().insert(ri);
            }
        }

        Self { excl }
    }
}

/// Maps a table's key column values to record indices, rejecting
/// duplicate keys with [`Error::DuplicateKey`].
pub fn build_key_index(table: &dyn Table) -> Result<HashMap<String, u32>> {
    let key_col = table.key_column();
    let mut index = HashMap::with_capacity(table.num_records());

    for record in 0..table.num_records() {
        let key = table.cell(record, key_col).to_owned();

        if index.insert(key.clone(), record as u32).is_some() {
            return Err(Error::DuplicateKey(format!(
                "key '{}' appears more than once",
                key
            )));
        }
    }

    Ok(index)
}
