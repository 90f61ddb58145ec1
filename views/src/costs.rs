use analytics_engine::{
    aggregate_spend, budget_status, current_month_lookup, monthly_breakdown, monthly_cost_series,
    tokens_in_millions, total_tokens, AggregateSpend, BreakdownRow, BudgetStatus,
    MonthlyCostPoint,
};
use chrono::NaiveDate;
use dashboard_core::CostRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsModel {
    pub budget: BudgetStatus,
    pub spend: AggregateSpend,
    pub total_tokens_millions: f64,
    pub current_month_tokens_millions: Option<f64>,
    pub months_tracked: usize,
    pub series: Vec<MonthlyCostPoint>,
    pub breakdown: Vec<BreakdownRow>,
}

impl CostsModel {
    /// `records` arrive ordered by month, oldest first.
    pub fn build(records: &[CostRecord], today: NaiveDate) -> Self {
        let current = current_month_lookup(records, today);
        let spend = aggregate_spend(records);

        Self {
            budget: budget_status(current),
            total_tokens_millions: tokens_in_millions(spend.total_tokens),
            current_month_tokens_millions: current.map(|r| tokens_in_millions(total_tokens(r))),
            spend,
            months_tracked: records.len(),
            series: monthly_cost_series(records),
            breakdown: monthly_breakdown(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_engine::BudgetLevel;

    fn month(month: &str, cost: f64, budget: f64, tokens: i64) -> CostRecord {
        let mut record = CostRecord::new(month, month);
        record.total_cost = Some(cost);
        record.monthly_budget = Some(budget);
        record.input_tokens = Some(tokens);
        record.output_tokens = Some(tokens / 2);
        record
    }

    #[test]
    fn test_costs_for_current_month() {
        let records = vec![
            month("2024-05", 40.0, 100.0, 2_000_000),
            month("2024-06", 92.0, 100.0, 1_000_000),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();

        let model = CostsModel::build(&records, today);
        assert_eq!(model.budget.month.as_deref(), Some("2024-06"));
        assert_eq!(model.budget.level, BudgetLevel::Critical);
        assert_eq!(model.spend.total_cost, 132.0);
        assert_eq!(model.total_tokens_millions, 4.5);
        assert_eq!(model.current_month_tokens_millions, Some(1.5));
        assert_eq!(model.months_tracked, 2);
        assert_eq!(model.breakdown[0].month, "2024-06");
        assert_eq!(model.series[0].month, "2024-05");
    }

    #[test]
    fn test_costs_without_current_month() {
        let records = vec![month("2023-01", 10.0, 50.0, 100)];
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();

        let model = CostsModel::build(&records, today);
        assert_eq!(model.budget.month, None);
        assert_eq!(model.budget.budget, 100.0);
        assert_eq!(model.budget.remaining, 100.0);
        assert_eq!(model.current_month_tokens_millions, None);
    }
}
