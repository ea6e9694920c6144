use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::MonthlyRecord;
use crate::types::{safe_div, Rate};

/// Share of current assets treated as liquid for the quick ratio.
pub const QUICK_ASSET_SHARE: f64 = 0.7;

/// Absolute budget variance still considered on plan.
pub const VARIANCE_TOLERANCE: Rate = 0.05;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioKind {
    #[serde(rename = "Gross Profit Margin")]
    GrossProfitMargin,
    #[serde(rename = "Operating Margin")]
    OperatingMargin,
    #[serde(rename = "EBITDA Margin")]
    EbitdaMargin,
    #[serde(rename = "Expense Ratio")]
    ExpenseRatio,
    #[serde(rename = "Revenue Growth (MoM)")]
    RevenueGrowthMom,
    #[serde(rename = "Return on Investment")]
    ReturnOnInvestment,
    #[serde(rename = "Current Ratio")]
    CurrentRatio,
    #[serde(rename = "Quick Ratio")]
    QuickRatio,
    #[serde(rename = "Operating Cash Flow Ratio")]
    OperatingCashFlowRatio,
    #[serde(rename = "Revenue Variance")]
    RevenueVariance,
    #[serde(rename = "Expense Variance")]
    ExpenseVariance,
}

impl RatioKind {
    pub const ALL: [RatioKind; 11] = [
        RatioKind::GrossProfitMargin,
        RatioKind::OperatingMargin,
        RatioKind::EbitdaMargin,
        RatioKind::ExpenseRatio,
        RatioKind::RevenueGrowthMom,
        RatioKind::ReturnOnInvestment,
        RatioKind::CurrentRatio,
        RatioKind::QuickRatio,
        RatioKind::OperatingCashFlowRatio,
        RatioKind::RevenueVariance,
        RatioKind::ExpenseVariance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RatioKind::GrossProfitMargin => "Gross Profit Margin",
            RatioKind::OperatingMargin => "Operating Margin",
            RatioKind::EbitdaMargin => "EBITDA Margin",
            RatioKind::ExpenseRatio => "Expense Ratio",
            RatioKind::RevenueGrowthMom => "Revenue Growth (MoM)",
            RatioKind::ReturnOnInvestment => "Return on Investment",
            RatioKind::CurrentRatio => "Current Ratio",
            RatioKind::QuickRatio => "Quick Ratio",
            RatioKind::OperatingCashFlowRatio => "Operating Cash Flow Ratio",
            RatioKind::RevenueVariance => "Revenue Variance",
            RatioKind::ExpenseVariance => "Expense Variance",
        }
    }

    pub fn target(&self) -> f64 {
        match self {
            RatioKind::GrossProfitMargin => 0.25,
            RatioKind::OperatingMargin => 0.20,
            RatioKind::EbitdaMargin => 0.22,
            RatioKind::ExpenseRatio => 0.65,
            RatioKind::RevenueGrowthMom => 0.05,
            RatioKind::ReturnOnInvestment => 0.3,
            RatioKind::CurrentRatio => 2.0,
            RatioKind::QuickRatio => 1.5,
            RatioKind::OperatingCashFlowRatio => 1.2,
            RatioKind::RevenueVariance => 0.0,
            RatioKind::ExpenseVariance => 0.0,
        }
    }

    pub fn industry_avg(&self) -> f64 {
        match self {
            RatioKind::GrossProfitMargin => 0.22,
            RatioKind::OperatingMargin => 0.18,
            RatioKind::EbitdaMargin => 0.20,
            RatioKind::ExpenseRatio => 0.68,
            RatioKind::RevenueGrowthMom => 0.04,
            RatioKind::ReturnOnInvestment => 0.25,
            RatioKind::CurrentRatio => 1.8,
            RatioKind::QuickRatio => 1.3,
            RatioKind::OperatingCashFlowRatio => 1.0,
            RatioKind::RevenueVariance => -0.05,
            RatioKind::ExpenseVariance => 0.03,
        }
    }

    /// Variance ratios are judged by distance from plan, not by a floor.
    pub fn is_variance(&self) -> bool {
        matches!(self, RatioKind::RevenueVariance | RatioKind::ExpenseVariance)
    }
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioStatus {
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl RatioStatus {
    pub fn is_good(&self) -> bool {
        matches!(self, RatioStatus::Good)
    }
}

impl fmt::Display for RatioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioStatus::Good => f.write_str("Good"),
            RatioStatus::NeedsAttention => f.write_str("Needs Attention"),
        }
    }
}

/// One row of the ratio table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub ratio: RatioKind,
    pub value: f64,
    pub target: f64,
    pub industry_avg: f64,
    pub status: RatioStatus,
}

// ---------------------------------------------------------------------------
// Individual ratios
// ---------------------------------------------------------------------------

pub fn current_ratio(r: &MonthlyRecord) -> f64 {
    safe_div(r.current_assets, r.current_liabilities)
}

pub fn quick_ratio(r: &MonthlyRecord) -> f64 {
    safe_div(r.current_assets * QUICK_ASSET_SHARE, r.current_liabilities)
}

pub fn operating_cash_flow_ratio(r: &MonthlyRecord) -> f64 {
    safe_div(r.operating_cash_flow, r.current_liabilities)
}

/// (actual - budget) / budget
pub fn revenue_variance(r: &MonthlyRecord) -> Rate {
    safe_div(r.revenue - r.budget_revenue, r.budget_revenue)
}

pub fn expense_variance(r: &MonthlyRecord) -> Rate {
    safe_div(r.expenses - r.budget_expenses, r.budget_expenses)
}

/// latest / previous - 1, 0 without a usable previous month.
pub fn revenue_growth(latest: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> Rate {
    match previous {
        Some(p) if p.revenue != 0.0 => safe_div(latest.revenue, p.revenue) - 1.0,
        _ => 0.0,
    }
}

pub fn status_for(kind: RatioKind, value: f64) -> RatioStatus {
    let good = if kind.is_variance() {
        value.abs() <= VARIANCE_TOLERANCE
    } else {
        value >= kind.target()
    };
    if good {
        RatioStatus::Good
    } else {
        RatioStatus::NeedsAttention
    }
}

pub fn ratio_value(kind: RatioKind, latest: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> f64 {
    match kind {
        RatioKind::GrossProfitMargin => latest.profit_margin,
        // Operating and EBITDA margins collapse to profit / revenue: the
        // dataset carries no COGS, D&A or other operating lines.
        RatioKind::OperatingMargin | RatioKind::EbitdaMargin => {
            safe_div(latest.profit, latest.revenue)
        }
        RatioKind::ExpenseRatio => safe_div(latest.expenses, latest.revenue),
        RatioKind::RevenueGrowthMom => revenue_growth(latest, previous),
        RatioKind::ReturnOnInvestment => safe_div(latest.profit, latest.expenses),
        RatioKind::CurrentRatio => current_ratio(latest),
        RatioKind::QuickRatio => quick_ratio(latest),
        RatioKind::OperatingCashFlowRatio => operating_cash_flow_ratio(latest),
        RatioKind::RevenueVariance => revenue_variance(latest),
        RatioKind::ExpenseVariance => expense_variance(latest),
    }
}

/// The full ratio table for the latest month of a view. `previous` is the
/// month before it inside the same view, used for month-over-month growth.
pub fn ratio_panel(latest: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> Vec<RatioRow> {
    RatioKind::ALL
        .iter()
        .map(|&kind| {
            let value = ratio_value(kind, latest, previous);
            RatioRow {
                ratio: kind,
                value,
                target: kind.target(),
                industry_avg: kind.industry_avg(),
                status: status_for(kind, value),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MonthlyInputs;
    use chrono::NaiveDate;

    fn record(revenue: f64, expenses: f64, assets: f64, liabilities: f64) -> MonthlyRecord {
        MonthlyRecord::from_inputs(&MonthlyInputs {
            date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            revenue,
            expenses,
            budget_revenue: 1_050_000.0,
            budget_expenses: 640_000.0,
            operating_cash_flow: 400_000.0,
            investing_cash_flow: -100_000.0,
            financing_cash_flow: 0.0,
            current_assets: assets,
            current_liabilities: liabilities,
        })
    }

    fn row(rows: &[RatioRow], kind: RatioKind) -> &RatioRow {
        rows.iter().find(|r| r.ratio == kind).unwrap()
    }

    #[test]
    fn test_zero_liabilities_guard() {
        let r = record(1_000_000.0, 650_000.0, 400_000.0, 0.0);
        assert_eq!(current_ratio(&r), 0.0);
        assert_eq!(quick_ratio(&r), 0.0);
        assert_eq!(operating_cash_flow_ratio(&r), 0.0);
    }

    #[test]
    fn test_liquidity_ratios() {
        let r = record(1_000_000.0, 650_000.0, 400_000.0, 200_000.0);
        assert_eq!(current_ratio(&r), 2.0);
        assert!((quick_ratio(&r) - 1.4).abs() < 1e-12);
        assert_eq!(operating_cash_flow_ratio(&r), 2.0);
    }

    #[test]
    fn test_variance_ratios() {
        let r = record(1_000_000.0, 650_000.0, 400_000.0, 200_000.0);
        assert!((revenue_variance(&r) - (-50_000.0 / 1_050_000.0)).abs() < 1e-12);
        assert!((expense_variance(&r) - (10_000.0 / 640_000.0)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_budget_variance_is_zero() {
        let mut r = record(1_000_000.0, 650_000.0, 400_000.0, 200_000.0);
        r.budget_revenue = 0.0;
        r.budget_expenses = 0.0;
        assert_eq!(revenue_variance(&r), 0.0);
        assert_eq!(expense_variance(&r), 0.0);
    }

    #[test]
    fn test_status_rules() {
        assert_eq!(status_for(RatioKind::CurrentRatio, 2.0), RatioStatus::Good);
        assert_eq!(status_for(RatioKind::CurrentRatio, 1.99), RatioStatus::NeedsAttention);
        assert_eq!(status_for(RatioKind::RevenueVariance, -0.05), RatioStatus::Good);
        assert_eq!(status_for(RatioKind::RevenueVariance, 0.051), RatioStatus::NeedsAttention);
        assert_eq!(status_for(RatioKind::ExpenseVariance, 0.0), RatioStatus::Good);
    }

    #[test]
    fn test_panel_has_every_ratio_in_order() {
        let r = record(1_000_000.0, 650_000.0, 400_000.0, 200_000.0);
        let panel = ratio_panel(&r, None);
        let kinds: Vec<RatioKind> = panel.iter().map(|r| r.ratio).collect();
        assert_eq!(kinds, RatioKind::ALL.to_vec());
        assert_eq!(row(&panel, RatioKind::RevenueGrowthMom).value, 0.0);
        assert_eq!(row(&panel, RatioKind::GrossProfitMargin).value, 0.35);
        assert_eq!(row(&panel, RatioKind::ExpenseRatio).value, 0.65);
        assert_eq!(row(&panel, RatioKind::ExpenseRatio).status, RatioStatus::Good);
    }

    #[test]
    fn test_month_over_month_growth() {
        let prev = record(1_000_000.0, 650_000.0, 1.0, 1.0);
        let last = record(1_100_000.0, 650_000.0, 1.0, 1.0);
        let panel = ratio_panel(&last, Some(&prev));
        let growth = row(&panel, RatioKind::RevenueGrowthMom);
        assert!((growth.value - 0.1).abs() < 1e-12);
        assert!(growth.status.is_good());
    }

    #[test]
    fn test_ratio_kind_serializes_label() {
        let json = serde_json::to_string(&RatioKind::RevenueGrowthMom).unwrap();
        assert_eq!(json, "\"Revenue Growth (MoM)\"");
        let json = serde_json::to_string(&RatioStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"Needs Attention\"");
    }
}
