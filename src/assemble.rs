//! Turns the merged top-K pairs into the final output table shape: a
//! fresh `_id` column renumbered `0..K`, and every source column
//! carried over with an `ltable_`/`rtable_` prefix.

use crate::error::Result;
use crate::join::SimKey;
use crate::table::Table;

pub fn header(l: &dyn Table, r: &dyn Table) -> Vec<String> {
    let mut cols = vec!["_id".to_owned()];
    cols.extend(l.column_names().iter().map(|c| format!("ltable_{}", c)));
    cols.extend(r.column_names().iter().map(|c| format!("rtable_{}", c)));
    cols
}

pub fn rows(l: &dyn Table, r: &dyn Table, pairs: &[SimKey]) -> Vec<Vec<String>> {
    pairs
        .iter()
        .enumerate()
        .map(|(id, key)| {
            let mut row = Vec::with_capacity(1 + l.column_names().len() + r.column_names().len());
            row.push(id.to_string());

            for col in 0..l.column_names().len() {
                row.push(l.cell(key.l_idx as usize, col).to_owned());
            }
            for col in 0..r.column_names().len() {
                row.push(r.cell(key.r_idx as usize, col).to_owned());
            }

            row
        })
        .collect()
}

pub fn write_csv<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    l: &dyn Table,
    r: &dyn Table,
    pairs: &[SimKey],
) -> Result<()> {
    writer.write_record(header(l, r))?;

    for row in rows(l, r, pairs) {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnType, VecTable};

    fn table() -> VecTable {
        VecTable::new(
            vec!["id".to_owned(), "name".to_owned()],
            vec![ColumnType::Textual, ColumnType::Textual],
            vec![
                vec!["1".to_owned(), "john".to_owned()],
                vec!["2".to_owned(), "jane".to_owned()],
            ],
            0,
        )
    }

    #[test]
    fn header_prefixes_both_tables() {
        let l = table();
        let r = table();
        assert_eq!(
            header(&l, &r),
            vec!["_id", "ltable_id", "ltable_name", "rtable_id", "rtable_name"]
        );
    }

    #[test]
    fn rows_renumber_id_from_zero() {
        let l = table();
        let r = table();
        let pairs = vec![
            SimKey {
                sim: 0.9,
                l_idx: 1,
                r_idx: 0,
            },
            SimKey {
                sim: 0.5,
                l_idx: 0,
                r_idx: 1,
            },
        ];

        let out = rows(&l, &r, &pairs);
        assert_eq!(out[0][0], "0");
        assert_eq!(out[0][1], "2");
        assert_eq!(out[1][0], "1");
    }
}
