use crate::coerce::{round_to, OrZero};
use chrono::NaiveDate;
use dashboard_core::CostRecord;
use serde::{Deserialize, Serialize};

/// Budget assumed when the current month has no record or no usable budget.
pub const DEFAULT_MONTHLY_BUDGET: f64 = 100.0;
pub const WARNING_PERCENT: f64 = 80.0;
pub const CRITICAL_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCostPoint {
    pub month: String,
    pub cost: f64,
    pub budget: f64,
    pub input_tokens: f64,
    pub output_tokens: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSpend {
    pub total_cost: f64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Healthy,
    Warning,
    Critical,
}

impl BudgetLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= CRITICAL_PERCENT {
            BudgetLevel::Critical
        } else if percent >= WARNING_PERCENT {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub month: Option<String>,
    pub spent: f64,
    pub budget: f64,
    pub remaining: f64,
    pub used_percent: f64,
    pub level: BudgetLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub id: String,
    pub month: String,
    pub input_tokens_k: f64,
    pub output_tokens_k: f64,
    pub total_cost: f64,
    pub budget: f64,
    /// None when the month has no positive budget
    pub used_percent: Option<f64>,
    pub level: Option<BudgetLevel>,
}

/// Chart series in input order: cost to cents, tokens in thousands.
pub fn monthly_cost_series(records: &[CostRecord]) -> Vec<MonthlyCostPoint> {
    records
        .iter()
        .map(|record| MonthlyCostPoint {
            month: record.month.clone(),
            cost: round_to(record.total_cost.or_zero(), 2),
            budget: record.monthly_budget.or_zero(),
            input_tokens: thousands(record.input_tokens),
            output_tokens: thousands(record.output_tokens),
        })
        .collect()
}

pub fn current_month_key(today: NaiveDate) -> String {
    today.format("%Y-%m").to_string()
}

/// First record whose month matches `today`'s month.
pub fn current_month_lookup(records: &[CostRecord], today: NaiveDate) -> Option<&CostRecord> {
    let key = current_month_key(today);
    records.iter().find(|record| record.month == key)
}

pub fn aggregate_spend(records: &[CostRecord]) -> AggregateSpend {
    records
        .iter()
        .fold(AggregateSpend::default(), |mut spend, record| {
            spend.total_cost += record.total_cost.or_zero();
            spend.total_tokens += total_tokens(record);
            spend
        })
}

pub fn total_tokens(record: &CostRecord) -> i64 {
    record.input_tokens.unwrap_or(0) + record.output_tokens.unwrap_or(0)
}

/// Percentage of `budget` consumed, or None when the budget is not positive.
pub fn used_percent(spent: f64, budget: Option<f64>) -> Option<f64> {
    match budget {
        Some(budget) if budget > 0.0 && budget.is_finite() => Some(spent * 100.0 / budget),
        _ => None,
    }
}

/// Budget card for the current month, falling back to the default budget.
pub fn budget_status(current: Option<&CostRecord>) -> BudgetStatus {
    let spent = current.and_then(|r| r.total_cost).unwrap_or(0.0);
    let budget = current
        .and_then(|r| r.monthly_budget)
        .filter(|b| *b > 0.0 && b.is_finite())
        .unwrap_or(DEFAULT_MONTHLY_BUDGET);
    let used = used_percent(spent, Some(budget)).unwrap_or(0.0);

    BudgetStatus {
        month: current.map(|r| r.month.clone()),
        spent,
        budget,
        remaining: budget - spent,
        used_percent: used,
        level: BudgetLevel::from_percent(used),
    }
}

/// Table rows, newest month first.
pub fn monthly_breakdown(records: &[CostRecord]) -> Vec<BreakdownRow> {
    records
        .iter()
        .rev()
        .map(|record| {
            let total_cost = record.total_cost.or_zero();
            let used = used_percent(total_cost, record.monthly_budget);
            BreakdownRow {
                id: record.id.clone(),
                month: record.month.clone(),
                input_tokens_k: thousands(record.input_tokens),
                output_tokens_k: thousands(record.output_tokens),
                total_cost: round_to(total_cost, 2),
                budget: record.monthly_budget.or_zero(),
                used_percent: used,
                level: used.map(BudgetLevel::from_percent),
            }
        })
        .collect()
}

pub fn tokens_in_millions(tokens: i64) -> f64 {
    round_to(tokens as f64 / 1_000_000.0, 2)
}

fn thousands(tokens: Option<i64>) -> f64 {
    round_to(tokens.or_zero() / 1000.0, 1)
}
