//! The top-level entry point: wires schema alignment, tokenization,
//! vocabulary, configuration generation and the parallel join
//! together.

use colored::Colorize;

use crate::assemble::{header, rows};
use crate::candidates::{build_key_index, CandidateIndex};
use crate::configs::{generate_configurations, resolve_config_count, resolve_worker_count};
use crate::error::{Error, Result};
use crate::join::SimKey;
use crate::parallel;
use crate::schema::{build_correspondence, select_features};
use crate::store::RecordStore;
use crate::table::Table;
use crate::tokenize::{tokenize_table, TokenOccurrence};
use crate::vocab::build_token_order;

/// The assembled result: a CSV-ready header plus one row per surviving
/// pair, already carrying the `ltable_`/`rtable_` prefixes and a fresh
/// `_id`.
pub struct DebugBlockerOutput {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn field_totals(records: &[Vec<TokenOccurrence>], num_fields: usize) -> Vec<u64> {
    let mut totals = vec![0u64; num_fields];
    for record in records {
        for &(_, field) in record {
            totals[field as usize] += 1;
        }
    }
    totals
}

fn log(verbose: bool, message: &str) {
    if verbose {
        eprintln!("{}", message.cyan());
    }
}

/// Runs the full pipeline end to end.
///
/// `attr_corres` mirrors the external DataFrame collaborator's column
/// correspondence (`None` triggers name-based auto-discovery);
/// `candidate_pairs` are `(l_key, r_key)` string pairs the upstream
/// blocker already proposed; `output_size` is the final top-K bound;
/// `n_jobs`/`n_configs` follow the resolution rules in
/// [`crate::configs`].
#[allow(clippy::too_many_arguments)]
pub fn debug_blocker(
    l: &dyn Table,
    r: &dyn Table,
    attr_corres: Option<&[(String, String)]>,
    candidate_pairs: &[(String, String)],
    output_size: i64,
    n_jobs: i32,
    n_configs: i32,
    verbose: bool,
) -> Result<DebugBlockerOutput> {
    if l.num_records() == 0 || r.num_records() == 0 {
        return Err(Error::InvalidInput(
            "both tables must contain at least one record".to_owned(),
        ));
    }

    if output_size <= 0 {
        return Err(Error::InvalidInput(
            "output_size must be a positive integer".to_owned(),
        ));
    }

    let pairs = build_correspondence(l, r, attr_corres)?;
    log(verbose, &format!("resolved {} column pairs", pairs.len()));

    let selected_positions = select_features(l, r, &pairs)?;
    let selected: Vec<(usize, usize)> = selected_positions
        .iter()
        .map(|&pos| pairs[pos])
        .collect();

    log(
        verbose,
        &format!("selected {} feature columns", selected.len()),
    );

    let l_cols: Vec<usize> = selected.iter().map(|&(li, _)| li).collect();
    let r_cols: Vec<usize> = selected.iter().map(|&(_, ri)| ri).collect();

    let l_tokens = tokenize_table(l, &l_cols);
    let r_tokens = tokenize_table(r, &r_cols);

    let order = build_token_order(&l_tokens, &r_tokens);
    if order.is_empty() {
        return Err(Error::NoUsableFeatures(
            "tokenization produced an empty vocabulary".to_owned(),
        ));
    }

    log(verbose, &format!("vocabulary size: {}", order.len()));

    let l_store = RecordStore::build(&l_tokens, &order);
    let r_store = RecordStore::build(&r_tokens, &order);

    let l_key_index = build_key_index(l)?;
    let r_key_index = build_key_index(r)?;
    let candidates = CandidateIndex::build(candidate_pairs, &l_key_index, &r_key_index);

    let num_fields = selected.len();
    let l_totals = field_totals(&l_tokens, num_fields);
    let r_totals = field_totals(&r_tokens, num_fields);

    let configs = generate_configurations(
        num_fields,
        &l_totals,
        &r_totals,
        l_store.len(),
        r_store.len(),
    );

    if configs.is_empty() {
        return Err(Error::ConfigEmpty(
            "no configurations could be generated from the selected features".to_owned(),
        ));
    }

    log(verbose, &format!("generated {} configurations", configs.len()));

    let n_cpus = num_cpus::get();
    let workers = resolve_worker_count(n_jobs, n_cpus);
    let resolved_n_configs = resolve_config_count(n_jobs, n_configs, configs.len(), n_cpus)?;

    log(
        verbose,
        &format!(
            "evaluating {} of {} configurations across {} worker(s)",
            resolved_n_configs,
            configs.len(),
            workers
        ),
    );

    let merged: Vec<SimKey> = parallel::run(
        &l_store,
        &r_store,
        &configs,
        &candidates,
        workers,
        resolved_n_configs,
        output_size as usize,
    )?;

    log(verbose, &format!("found {} pairs", merged.len()));

    Ok(DebugBlockerOutput {
        header: header(l, r),
        rows: rows(l, r, &merged),
    })
}
