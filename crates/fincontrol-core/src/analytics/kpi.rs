use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::charts::{cash_flow_components, department_summary, CashFlowComponent, DepartmentTotals};
use crate::analytics::ratios::{ratio_panel, RatioRow};
use crate::analytics::view::{latest_record, ViewConfig};
use crate::error::FinControlError;
use crate::format::{currency_format, percent_format};
use crate::records::{DepartmentRecord, MonthlyRecord};
use crate::types::{safe_div, Money, Pct};
use crate::FinControlResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A headline metric and its change against the complement period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub label: String,
    pub value: f64,
    /// Percent change for totals, percentage-point change for margins.
    pub change: Pct,
    /// Value as the dashboard prints it
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_revenue: KpiCard,
    pub total_expenses: KpiCard,
    pub total_profit: KpiCard,
    /// Mean of monthly profit margins, in percent
    pub avg_profit_margin: KpiCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub avg_operating_cash_flow: Money,
    pub avg_net_cash_flow: Money,
    /// Mean of operating cash flow / revenue, in percent
    pub cash_conversion_pct: Pct,
    /// Mean current assets / mean current liabilities
    pub avg_current_ratio: f64,
    /// Operating / Investing / Financing of the latest month
    pub components: Vec<CashFlowComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub record_count: usize,
    pub department_count: usize,
    pub scenario_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

/// Everything the dashboard derives from a filtered view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregates {
    pub kpis: KpiSummary,
    pub departments: Vec<DepartmentTotals>,
    pub ratios: Vec<RatioRow>,
    pub cash_flow: CashFlowSummary,
    pub summary: DataSummary,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sum_by(rows: &[MonthlyRecord], f: impl Fn(&MonthlyRecord) -> f64) -> f64 {
    rows.iter().map(f).sum()
}

fn mean_by(rows: &[MonthlyRecord], f: impl Fn(&MonthlyRecord) -> f64) -> f64 {
    safe_div(sum_by(rows, f), rows.len() as f64)
}

/// (current - prior) / prior * 100, 0 unless prior is positive.
pub fn pct_change(current: f64, prior: f64) -> Pct {
    if prior > 0.0 {
        (current - prior) / prior * 100.0
    } else {
        0.0
    }
}

/// Base rows strictly before the first filtered month.
pub fn complement_period<'a>(
    base: &'a [MonthlyRecord],
    filtered: &[MonthlyRecord],
) -> &'a [MonthlyRecord] {
    match filtered.first() {
        Some(first) => {
            let end = base.partition_point(|r| r.date < first.date);
            &base[..end]
        }
        None => &[],
    }
}

fn total_card(
    label: &str,
    filtered: &[MonthlyRecord],
    prior: &[MonthlyRecord],
    f: impl Fn(&MonthlyRecord) -> f64 + Copy,
) -> KpiCard {
    let value = sum_by(filtered, f);
    let change = if prior.is_empty() {
        0.0
    } else {
        pct_change(value, sum_by(prior, f))
    };
    KpiCard {
        label: label.to_string(),
        value,
        change,
        display: currency_format(value),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// KPI cards for the filtered window. The comparison period is always the
/// unperturbed base table.
pub fn kpi_summary(base: &[MonthlyRecord], filtered: &[MonthlyRecord]) -> KpiSummary {
    let prior = complement_period(base, filtered);

    let avg_margin = mean_by(filtered, |r| r.profit_margin) * 100.0;
    let margin_change = if prior.is_empty() {
        0.0
    } else {
        avg_margin - mean_by(prior, |r| r.profit_margin) * 100.0
    };

    KpiSummary {
        total_revenue: total_card("Total Revenue", filtered, prior, |r| r.revenue),
        total_expenses: total_card("Total Expenses", filtered, prior, |r| r.expenses),
        total_profit: total_card("Total Profit", filtered, prior, |r| r.profit),
        avg_profit_margin: KpiCard {
            label: "Avg Profit Margin".to_string(),
            value: avg_margin,
            change: margin_change,
            display: percent_format(avg_margin / 100.0),
        },
    }
}

pub fn cash_flow_summary(base: &[MonthlyRecord], filtered: &[MonthlyRecord]) -> CashFlowSummary {
    CashFlowSummary {
        avg_operating_cash_flow: mean_by(filtered, |r| r.operating_cash_flow),
        avg_net_cash_flow: mean_by(filtered, |r| r.net_cash_flow),
        cash_conversion_pct: mean_by(filtered, |r| safe_div(r.operating_cash_flow, r.revenue))
            * 100.0,
        avg_current_ratio: safe_div(
            mean_by(filtered, |r| r.current_assets),
            mean_by(filtered, |r| r.current_liabilities),
        ),
        components: cash_flow_components(filtered, base),
    }
}

pub fn data_summary(
    filtered: &[MonthlyRecord],
    config: &ViewConfig,
) -> DataSummary {
    let scenario_active = config.scenario_active();
    DataSummary {
        period_start: filtered.first().map(|r| r.date),
        period_end: filtered.last().map(|r| r.date),
        record_count: filtered.len(),
        department_count: config.departments.len(),
        scenario_active,
        scenario: scenario_active.then(|| config.scenario_label()),
    }
}

/// Build every aggregate the dashboard shows for one view.
pub fn compute_aggregates(
    base: &[MonthlyRecord],
    filtered: &[MonthlyRecord],
    filtered_department: &[DepartmentRecord],
    config: &ViewConfig,
) -> FinControlResult<Aggregates> {
    let latest = latest_record(filtered, base).ok_or_else(|| {
        FinControlError::InsufficientData("No monthly record to compute ratios from".into())
    })?;
    // Month-over-month growth only looks inside the filtered window.
    let previous = if filtered.len() > 1 {
        filtered.get(filtered.len() - 2)
    } else {
        None
    };

    Ok(Aggregates {
        kpis: kpi_summary(base, filtered),
        departments: department_summary(filtered_department),
        ratios: ratio_panel(latest, previous),
        cash_flow: cash_flow_summary(base, filtered),
        summary: data_summary(filtered, config),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MonthlyInputs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: NaiveDate, revenue: f64, expenses: f64) -> MonthlyRecord {
        MonthlyRecord::from_inputs(&MonthlyInputs {
            date: d,
            revenue,
            expenses,
            budget_revenue: revenue,
            budget_expenses: expenses,
            operating_cash_flow: (revenue - expenses) * 0.5,
            investing_cash_flow: -1_000.0,
            financing_cash_flow: 500.0,
            current_assets: 4_000.0,
            current_liabilities: 2_000.0,
        })
    }

    fn base() -> Vec<MonthlyRecord> {
        vec![
            record(date(2026, 1, 31), 10_000.0, 6_000.0),
            record(date(2026, 2, 28), 10_000.0, 7_000.0),
            record(date(2026, 3, 31), 12_000.0, 6_000.0),
            record(date(2026, 4, 30), 18_000.0, 9_000.0),
        ]
    }

    #[test]
    fn test_complement_period_is_prefix() {
        let base = base();
        let prior = complement_period(&base, &base[2..]);
        assert_eq!(prior.len(), 2);
        assert_eq!(prior[1].date, date(2026, 2, 28));
        assert!(complement_period(&base, &base).is_empty());
        assert!(complement_period(&base, &[]).is_empty());
    }

    #[test]
    fn test_kpi_change_against_prior_months() {
        let base = base();
        let k = kpi_summary(&base, &base[2..]);
        // current revenue 30k vs prior 20k
        assert_eq!(k.total_revenue.value, 30_000.0);
        assert!((k.total_revenue.change - 50.0).abs() < 1e-9);
        // current expenses 15k vs prior 13k
        assert!((k.total_expenses.change - (2_000.0 / 13_000.0 * 100.0)).abs() < 1e-9);
        // current profit 15k vs prior 7k
        assert_eq!(k.total_profit.value, 15_000.0);
        // margins: current (0.5 + 0.5)/2 = 50%, prior (0.4 + 0.3)/2 = 35%
        assert!((k.avg_profit_margin.value - 50.0).abs() < 1e-9);
        assert!((k.avg_profit_margin.change - 15.0).abs() < 1e-9);
        assert_eq!(k.total_revenue.display, "$30.0K");
        assert_eq!(k.avg_profit_margin.display, "50.0%");
    }

    #[test]
    fn test_kpi_change_zero_without_prior_months() {
        let base = base();
        let k = kpi_summary(&base, &base);
        assert_eq!(k.total_revenue.change, 0.0);
        assert_eq!(k.total_expenses.change, 0.0);
        assert_eq!(k.total_profit.change, 0.0);
        assert_eq!(k.avg_profit_margin.change, 0.0);
    }

    #[test]
    fn test_pct_change_guard() {
        assert_eq!(pct_change(100.0, 0.0), 0.0);
        assert_eq!(pct_change(100.0, -50.0), 0.0);
        assert_eq!(pct_change(150.0, 100.0), 50.0);
    }

    #[test]
    fn test_cash_flow_summary() {
        let base = base();
        let cf = cash_flow_summary(&base, &base[..2]);
        // operating: 2000, 1500
        assert_eq!(cf.avg_operating_cash_flow, 1_750.0);
        // net: 1500, 1000
        assert_eq!(cf.avg_net_cash_flow, 1_250.0);
        assert!((cf.cash_conversion_pct - 17.5).abs() < 1e-9);
        assert_eq!(cf.avg_current_ratio, 2.0);
        assert_eq!(cf.components.len(), 3);
        assert_eq!(cf.components[0].amount, 1_500.0);
    }

    #[test]
    fn test_empty_filtered_ratios_use_base_latest() {
        let base = base();
        let agg = compute_aggregates(&base, &[], &[], &ViewConfig::default()).unwrap();
        let gross = &agg.ratios[0];
        // latest base month: 18k revenue, 9k expenses
        assert_eq!(gross.value, 0.5);
        assert_eq!(agg.kpis.total_revenue.value, 0.0);
        assert_eq!(agg.summary.record_count, 0);
        assert_eq!(agg.cash_flow.components[0].amount, 4_500.0);
    }

    #[test]
    fn test_data_summary() {
        let base = base();
        let cfg = ViewConfig {
            revenue_scenario_pct: 5.0,
            ..ViewConfig::default()
        };
        let s = data_summary(&base[1..], &cfg);
        assert_eq!(s.period_start, Some(date(2026, 2, 28)));
        assert_eq!(s.period_end, Some(date(2026, 4, 30)));
        assert_eq!(s.record_count, 3);
        assert_eq!(s.department_count, 5);
        assert_eq!(s.scenario.as_deref(), Some("Revenue +5%, Expenses +0%"));
    }
}
