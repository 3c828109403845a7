//! Per record, two length-aligned `u32` arrays: sorted token ranks
//! and their originating field indices.

use crate::tokenize::TokenOccurrence;
use crate::vocab::TokenOrder;

#[derive(Debug, Clone)]
pub struct RecordStore {
    /// `tokens[i]` is strictly ascending by construction: within a
    /// record, token strings are distinct (suffixed on repeat) and
    /// the global order is a bijection, so no two entries share a
    /// rank.
    pub tokens: Vec<Vec<u32>>,
    pub fields: Vec<Vec<u32>>,
}

impl RecordStore {
    pub fn build(records: &[Vec<TokenOccurrence>], order: &TokenOrder) -> Self {
        let mut tokens = Vec::with_capacity(records.len());
        let mut fields = Vec::with_capacity(records.len());

        for record in records {
            let mut ranked: Vec<(u32, u32)> = record
                .iter()
                .filter_map(|(token, field)| order.rank(token).map(|rank| (rank, *field)))
                .collect();

            ranked.sort_unstable_by_key(|&(rank, _)| rank);

            let (toks, flds): (Vec<u32>, Vec<u32>) = ranked.into_iter().unzip();
            tokens.push(toks);
            fields.push(flds);
        }

        Self { tokens, fields }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
