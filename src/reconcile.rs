//! Reconciliation engine: full outer join of two periods with variances

use crate::types::{BalanceMap, ComparisonRow};
use std::collections::BTreeSet;

/// Merge the current and prior period into comparison rows sorted by account.
///
/// Accounts missing from one period take a zero balance for it. Ordering is
/// plain byte-wise string order on the account key, independent of locale.
pub fn reconcile(current: &BalanceMap, prior: &BalanceMap) -> Vec<ComparisonRow> {
    let accounts: BTreeSet<&String> = current.keys().chain(prior.keys()).collect();

    accounts
        .into_iter()
        .map(|account| {
            let current_record = current.get(account);
            let prior_record = prior.get(account);

            let label = current_record
                .map(|r| r.label.as_str())
                .filter(|label| !label.is_empty())
                .or_else(|| prior_record.map(|r| r.label.as_str()))
                .unwrap_or_default()
                .to_string();

            let balance_current = current_record.map(|r| r.balance).unwrap_or(0.0);
            let balance_prior = prior_record.map(|r| r.balance).unwrap_or(0.0);

            compare(account.clone(), label, balance_current, balance_prior)
        })
        .collect()
}

/// Build one row. The percentage stays unset whenever the prior balance is zero.
pub fn compare(account: String, label: String, balance_current: f64, balance_prior: f64) -> ComparisonRow {
    let variance_absolute = balance_current - balance_prior;
    let variance_percent = if balance_prior != 0.0 {
        Some(variance_absolute / balance_prior)
    } else {
        None
    };

    ComparisonRow {
        account,
        label,
        balance_current,
        balance_prior,
        variance_absolute,
        variance_percent,
    }
}
