//! Tokenizer and record normalizer.
//!
//! Lowercases and single-space-splits each selected column, concatenates
//! columns per record in selected-field order, and makes token strings
//! distinct within a record by suffixing repeats with `_k`.

use std::collections::HashMap;

use crate::table::{normalize_cell, Table};

/// A single token occurrence: the token's surface form and the
/// position (within the selected feature list) of the column it came
/// from.
pub type TokenOccurrence = (String, u32);

/// Tokenizes every record of `table`, reading only `columns` (already
/// resolved table-column indices, one per selected feature, in
/// selected-field order).
pub fn tokenize_table(table: &dyn Table, columns: &[usize]) -> Vec<Vec<TokenOccurrence>> {
    (0..table.num_records())
        .map(|record| tokenize_record(table, columns, record))
        .collect()
}

fn tokenize_record(table: &dyn Table, columns: &[usize], record: usize) -> Vec<TokenOccurrence> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut tokens = Vec::new();

    for (field_index, &col) in columns.iter().enumerate() {
        let ty = table.column_type(col);
        let raw = table.cell(record, col);
        let normalized = normalize_cell(raw, ty).unwrap_or_default();

        for piece in normalized.to_lowercase().split(' ') {
            if piece.is_empty() {
                continue;
            }

            let occurrences = seen.entry(piece.to_owned()).or_insert(0);
            let k = *occurrences;
            *occurrences += 1;

            let token = if k == 0 {
                piece.to_owned()
            } else {
                format!("{}_{}", piece, k)
            };

            tokens.push((token, field_index as u32));
        }
    }

    tokens
}
