//! Column correspondence and feature selection.
//!
//! Aligns the two input schemas into a single ordered list of
//! `(l_col, r_col)` pairs, drops pairs that are numeric on both sides,
//! and scores the remaining textual columns by a uniqueness/density
//! weight to pick at most 8 to carry into tokenization.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::table::{normalize_cell, Table};

pub const SELECTED_FIELDS_UPPER_BOUND: usize = 8;

/// Builds the best-effort correspondence the external DataFrame
/// collaborator would normally provide: pairs columns of identical
/// name across `l` and `r`, in `l`'s column order.
pub fn auto_correspondence(l: &dyn Table, r: &dyn Table) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for name in l.column_names() {
        if r.column_names().iter().any(|rn| rn == name) {
            pairs.push((name.clone(), name.clone()));
        }
    }

    pairs
}

/// Resolves user-supplied or auto-discovered column correspondence
/// into index pairs, guaranteeing the key pair is present.
fn resolve_corres_list(
    l: &dyn Table,
    r: &dyn Table,
    attr_corres: Option<&[(String, String)]>,
) -> Result<Vec<(usize, usize)>> {
    let named_pairs: Vec<(String, String)> = match attr_corres {
        Some(pairs) if !pairs.is_empty() => pairs.to_vec(),
        _ => {
            let auto = auto_correspondence(l, r);
            if auto.is_empty() {
                return Err(Error::InvalidInput(
                    "no attribute correspondence given, and none could be inferred".to_owned(),
                ));
            }
            auto
        }
    };

    let mut indexed = Vec::with_capacity(named_pairs.len() + 1);
    for (lname, rname) in &named_pairs {
        let lidx = l.column_index(lname).ok_or_else(|| {
            Error::InvalidInput(format!("column '{}' not found in left table", lname))
        })?;
        let ridx = r.column_index(rname).ok_or_else(|| {
            Error::InvalidInput(format!("column '{}' not found in right table", rname))
        })?;
        indexed.push((lidx, ridx));
    }

    let l_key_idx = l.key_column();
    let r_key_idx = r.key_column();

    if !indexed.iter().any(|&(li, ri)| li == l_key_idx && ri == r_key_idx) {
        indexed.push((l_key_idx, r_key_idx));
    }

    Ok(indexed)
}

/// Drops pairs that are numeric on both sides (excluding the key
/// pair). Fails with `NoUsableFeatures` when nothing but the key
/// pair survives.
fn filter_numeric_pairs(
    l: &dyn Table,
    r: &dyn Table,
    mut pairs: Vec<(usize, usize)>,
) -> Result<Vec<(usize, usize)>> {
    let l_key_idx = l.key_column();
    let r_key_idx = r.key_column();

    pairs.retain(|&(li, ri)| {
        let is_key_pair = li == l_key_idx && ri == r_key_idx;
        is_key_pair || !(l.column_type(li).is_numeric() && r.column_type(ri).is_numeric())
    });

    let only_key_left = pairs.len() == 1 && {
        let (li, ri) = pairs[0];
        li == l_key_idx && ri == r_key_idx
    };

    if pairs.is_empty() || only_key_left {
        return Err(Error::NoUsableFeatures(
            "every non-key column pair is numeric on both sides".to_owned(),
        ));
    }

    Ok(pairs)
}

/// Builds and filters the column correspondence: the public entry
/// point for schema alignment, used before feature selection.
pub fn build_correspondence(
    l: &dyn Table,
    r: &dyn Table,
    attr_corres: Option<&[(String, String)]>,
) -> Result<Vec<(usize, usize)>> {
    let pairs = resolve_corres_list(l, r, attr_corres)?;
    filter_numeric_pairs(l, r, pairs)
}

fn feature_weight(table: &dyn Table, col: usize) -> f64 {
    let n = table.num_records();
    if n == 0 {
        return 0.0;
    }

    let ty = table.column_type(col);
    let mut distinct: HashSet<String> = HashSet::new();
    let mut non_empty = 0usize;

    for record in 0..n {
        if let Some(value) = normalize_cell(table.cell(record, col), ty) {
            distinct.insert(value);
            non_empty += 1;
        }
    }

    let non_empty_ratio = non_empty as f64 / n as f64;
    let selectivity = if non_empty == 0 {
        0.0
    } else {
        distinct.len() as f64 / non_empty as f64
    };

    non_empty_ratio + selectivity
}

/// Selects up to [`SELECTED_FIELDS_UPPER_BOUND`] columns from the
/// aligned, filtered schema by combined uniqueness/density score
/// Returns positions into `pairs`, excluding the key pair.
pub fn select_features(l: &dyn Table, r: &dyn Table, pairs: &[(usize, usize)]) -> Result<Vec<usize>> {
    let l_key_idx = l.key_column();
    let r_key_idx = r.key_column();

    let key_pos = pairs
        .iter()
        .position(|&(li, ri)| li == l_key_idx && ri == r_key_idx)
        .ok_or_else(|| Error::SchemaMismatch("key pair missing from correspondence".to_owned()))?;

    let mut scored: Vec<(usize, f64)> = pairs
        .iter()
        .enumerate()
        .filter(|&(pos, _)| pos != key_pos)
        .map(|(pos, &(li, ri))| (pos, feature_weight(l, li) * feature_weight(r, ri)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let take = scored.len().min(SELECTED_FIELDS_UPPER_BOUND);
    let selected: Vec<usize> = scored.into_iter().take(take).map(|(pos, _)| pos).collect();

    if selected.is_empty() {
        return Err(Error::NoUsableFeatures(
            "feature scoring left no selectable column".to_owned(),
        ));
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnType, VecTable};

    fn table(rows: Vec<Vec<&str>>, cols: Vec<&str>, types: Vec<ColumnType>, key: usize) -> VecTable {
        VecTable::new(
            cols.into_iter().map(|s| s.to_owned()).collect(),
            types,
            rows.into_iter()
                .map(|row| row.into_iter().map(|s| s.to_owned()).collect())
                .collect(),
            key,
        )
    }

    #[test]
    fn auto_correspondence_matches_by_name() {
        let l = table(
            vec![vec!["1", "john", "nyc"]],
            vec!["id", "name", "city"],
            vec![ColumnType::Textual; 3],
            0,
        );
        let r = table(
            vec![vec!["1", "john", "other"]],
            vec!["id", "name", "extra"],
            vec![ColumnType::Textual; 3],
            0,
        );

        let pairs = auto_correspondence(&l, &r);
        assert_eq!(
            pairs,
            vec![
                ("id".to_owned(), "id".to_owned()),
                ("name".to_owned(), "name".to_owned())
            ]
        );
    }

    #[test]
    fn numeric_only_non_key_fails() {
        let l = table(
            vec![vec!["1", "10"]],
            vec!["id", "age"],
            vec![ColumnType::Textual, ColumnType::Numeric],
            0,
        );
        let r = table(
            vec![vec!["1", "11"]],
            vec!["id", "age"],
            vec![ColumnType::Textual, ColumnType::Numeric],
            0,
        );

        let err = build_correspondence(&l, &r, None).unwrap_err();
        assert!(matches!(err, Error::NoUsableFeatures(_)));
    }

    #[test]
    fn selects_up_to_eight_non_key_columns() {
        let cols: Vec<&str> = vec!["id", "a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let l = table(
            vec![vec!["1", "x", "y", "z", "w", "v", "u", "t", "s", "r"]],
            cols.clone(),
            vec![ColumnType::Textual; 10],
            0,
        );
        let r = table(
            vec![vec!["1", "x", "y", "z", "w", "v", "u", "t", "s", "r"]],
            cols,
            vec![ColumnType::Textual; 10],
            0,
        );

        let pairs = build_correspondence(&l, &r, None).unwrap();
        let selected = select_features(&l, &r, &pairs).unwrap();
        assert_eq!(selected.len(), SELECTED_FIELDS_UPPER_BOUND);
    }
}
