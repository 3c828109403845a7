//! Global token order builder.
//!
//! Assigns every distinct token string a dense `u32` rank by ascending
//! (document frequency, lexicographic) order over `L ∪ R`. Frequency
//! here counts every occurrence within a record (after intra-record
//! suffixing), so a token repeated many times in one record weighs
//! more heavily than one spread across many records.

use std::collections::HashMap;

use crate::tokenize::TokenOccurrence;

/// Bijection between token strings and their dense rank.
pub struct TokenOrder {
    ranks: HashMap<String, u32>,
}

impl TokenOrder {
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn rank(&self, token: &str) -> Option<u32> {
        self.ranks.get(token).copied()
    }
}

/// Builds the global token order from both tables' tokenized records.
pub fn build_token_order(
    l_records: &[Vec<TokenOccurrence>],
    r_records: &[Vec<TokenOccurrence>],
) -> TokenOrder {
    let mut freq: HashMap<&str, u64> = HashMap::new();

    for records in [l_records, r_records] {
        for record in records {
            for (token, _) in record {
                *freq.entry(token.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut tokens: Vec<&str> = freq.keys().copied().collect();
    tokens.sort_by(|a, b| freq[a].cmp(&freq[b]).then_with(|| a.cmp(b)));

    let ranks = tokens
        .into_iter()
        .enumerate()
        .map(|(rank, token)| (token.to_owned(), rank as u32))
        .collect();

    TokenOrder { ranks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_dense_and_contiguous() {
        let l = vec![vec![("a".to_owned(), 0), ("b".to_owned(), 0)]];
        let r = vec![vec![("a".to_owned(), 0), ("c".to_owned(), 0)]];

        let order = build_token_order(&l, &r);
        assert_eq!(order.len(), 3);

        let mut ranks: Vec<u32> = (0..order.len() as u32).collect();
        ranks.sort();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn rarer_tokens_get_smaller_ranks() {
        // "a" appears 3 times total, "b" appears once.
        let l = vec![vec![
            ("a".to_owned(), 0),
            ("a".to_owned(), 0),
            ("b".to_owned(), 0),
        ]];
        let r = vec![vec![("a".to_owned(), 0)]];

        let order = build_token_order(&l, &r);
        assert!(order.rank("b").unwrap() < order.rank("a").unwrap());
    }

    #[test]
    fn ties_broken_lexicographically() {
        let l = vec![vec![("zebra".to_owned(), 0), ("apple".to_owned(), 0)]];
        let r: Vec<Vec<TokenOccurrence>> = vec![];

        let order = build_token_order(&l, &r);
        assert!(order.rank("apple").unwrap() < order.rank("zebra").unwrap());
    }
}
