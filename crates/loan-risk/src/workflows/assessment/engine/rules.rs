use super::super::domain::RiskLevel;
use super::policy::RiskPolicy;

/// Loan-to-income ratio clamped into `[0, 1]`.
pub(crate) fn risk_score(loan_amount: f64, annual_income: f64, policy: &RiskPolicy) -> f64 {
    let raw_ratio = loan_amount / (annual_income + policy.income_offset);
    raw_ratio.clamp(0.0, 1.0)
}

/// Boundaries are closed below, so a score sitting on a threshold takes the higher tier.
pub(crate) fn categorize(score: f64, policy: &RiskPolicy) -> RiskLevel {
    if score >= policy.high_threshold {
        RiskLevel::High
    } else if score >= policy.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
