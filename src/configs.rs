//! Configuration generation and job/configuration-count resolution.
//!
//! A configuration enumeration policy is deliberately built here as a
//! pure function of `(F, |L|, |R|, Ltotals, Rtotals)`, so identical
//! inputs always produce identical configurations regardless of how
//! many workers evaluate them. See `DESIGN.md` for the rationale.

use crate::error::{Error, Result};

/// A weighted token-subset view: which fields participate, and how
/// many of each field's earliest-ranked tokens enter the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub mask: Vec<bool>,
    pub budget: Vec<usize>,
}

impl Configuration {
    pub fn num_fields(&self) -> usize {
        self.mask.len()
    }
}

/// Per-field average token count across `L ∪ R`, rounded up and
/// floored at 1 (a field with any tokens at all gets at least a
/// 1-token budget).
fn tailored_budgets(l_totals: &[u64], r_totals: &[u64], l_len: usize, r_len: usize) -> Vec<usize> {
    let denom = (l_len + r_len).max(1) as f64;

    l_totals
        .iter()
        .zip(r_totals)
        .map(|(&lt, &rt)| {
            let avg = (lt + rt) as f64 / denom;
            (avg.ceil() as usize).max(1)
        })
        .collect()
}

/// Generates the ordered list of configurations to evaluate.
///
/// Always includes, in order:
/// 1. the all-fields, equal-budget configuration (required minimum);
/// 2. the all-fields, per-field-tailored-budget configuration;
/// 3. (when `num_fields > 1`) one leave-one-field-out configuration
///    per field, using tailored budgets for the remaining fields;
/// 4. (when `num_fields > 1`) one single-field configuration per
///    field, using double the tailored budget for that field alone —
///    a narrow, high-precision view to complement the broad ones above.
///
/// Duplicate `(mask, budget)` pairs are removed, keeping the first
/// occurrence, so the list stays small and evaluation isn't wasted on
/// redundant work.
pub fn generate_configurations(
    num_fields: usize,
    l_totals: &[u64],
    r_totals: &[u64],
    l_len: usize,
    r_len: usize,
) -> Vec<Configuration> {
    assert_eq!(l_totals.len(), num_fields);
    assert_eq!(r_totals.len(), num_fields);

    let tailored = tailored_budgets(l_totals, r_totals, l_len, r_len);
    let all_true = vec![true; num_fields];

    let mut configs = Vec::new();

    let uniform_budget = if num_fields == 0 {
        0
    } else {
        let sum: usize = tailored.iter().sum();
        ((sum as f64 / num_fields as f64).ceil() as usize).max(1)
    };
    configs.push(Configuration {
        mask: all_true.clone(),
        budget: vec![uniform_budget; num_fields],
    });

    configs.push(Configuration {
        mask: all_true.clone(),
        budget: tailored.clone(),
    });

    if num_fields > 1 {
        for skip in 0..num_fields {
            let mut mask = all_true.clone();
            mask[skip] = false;

            let mut budget = tailored.clone();
            budget[skip] = 0;

            configs.push(Configuration { mask, budget });
        }

        for only in 0..num_fields {
            let mut mask = vec![false; num_fields];
            mask[only] = true;

            let mut budget = vec![0; num_fields];
            budget[only] = (tailored[only] * 2).max(1);

            configs.push(Configuration { mask, budget });
        }
    }

    configs.retain({
        let mut seen: Vec<Configuration> = Vec::new();
        move |c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(c.clone());
                true
            }
        }
    });

    configs
}

/// Resolves the worker thread count from `n_jobs`: `-1` means all
/// CPUs; other negative values mean
/// `n_cpus + 1 + n_jobs`, floored at 1.
pub fn resolve_worker_count(n_jobs: i32, n_cpus: usize) -> usize {
    let n_cpus = n_cpus as i64;

    let resolved = if n_jobs == -1 {
        n_cpus
    } else if n_jobs < 0 {
        n_cpus + 1 + n_jobs as i64
    } else {
        n_jobs as i64
    };

    resolved.max(1) as usize
}

/// Resolves how many of the `total_configs` generated configurations
/// to actually evaluate.
pub fn resolve_config_count(
    n_jobs: i32,
    n_configs: i32,
    total_configs: usize,
    n_cpus: usize,
) -> Result<usize> {
    if n_jobs == 0 || n_configs == 0 || n_configs < -2 {
        return Err(Error::InvalidInput(
            "n_jobs must be nonzero and n_configs must be nonzero and >= -2".to_owned(),
        ));
    }

    let n_cpus = n_cpus as i64;

    let resolved: i64 = if n_configs == -2 {
        total_configs as i64
    } else if n_configs == -1 {
        if n_jobs < 0 {
            n_cpus + 1 + n_jobs as i64
        } else {
            n_jobs as i64
        }
    } else {
        n_configs as i64
    };

    let resolved = resolved.max(1) as usize;

    Ok(resolved.min(total_configs))
}
