use super::normalizer::normalize_header;
use crate::workflows::assessment::domain::{ANNUAL_INCOME_COLUMN, LOAN_AMOUNT_COLUMN};
use std::collections::HashMap;
use std::sync::OnceLock;

static COLUMN_ALIASES: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Normalize a raw header and resolve known aliases for the scoring columns.
pub fn canonical_column(raw: &str) -> String {
    let normalized = normalize_header(raw);
    match column_aliases().get(&normalized) {
        Some(canonical) => (*canonical).to_string(),
        None => normalized,
    }
}

fn column_aliases() -> &'static HashMap<String, &'static str> {
    COLUMN_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, &str)] = &[
            // Requested amount
            ("Loan Amount", LOAN_AMOUNT_COLUMN),
            ("Loan_Amount_Requested", LOAN_AMOUNT_COLUMN),
            ("Requested Amount", LOAN_AMOUNT_COLUMN),
            ("Amount Requested", LOAN_AMOUNT_COLUMN),
            // Income / turnover
            ("Annual Income", ANNUAL_INCOME_COLUMN),
            ("Annual_Turnover", ANNUAL_INCOME_COLUMN),
            ("Annual Revenue", ANNUAL_INCOME_COLUMN),
            ("Income", ANNUAL_INCOME_COLUMN),
        ];

        let mut map = HashMap::with_capacity(ALIASES.len());
        for (alias, canonical) in ALIASES {
            map.insert(normalize_header(alias), *canonical);
        }
        map
    })
}
