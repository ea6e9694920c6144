//! Data shaping for each dashboard chart. Every function is a pure
//! transform of already-filtered rows; chart selection stays with the
//! renderer.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::view::latest_record;
use crate::records::{Department, DepartmentRecord, MonthlyRecord};
use crate::types::{safe_div, Money, Rate};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const CORRELATION_FIELDS: [&str; 4] = ["revenue", "expenses", "profit", "profit_margin"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One point of the revenue/expense, margin and net cash flow trend lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    pub profit_margin: Rate,
    pub net_cash_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentTotals {
    pub department: Department,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowComponent {
    /// "Operating", "Investing" or "Financing"
    pub category: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub year: i32,
    /// Average profit margin per calendar month, Jan..Dec, 0 where no data
    pub values: [f64; 12],
}

/// Year × month pivot of average profit margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginHeatmap {
    pub columns: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

/// Pairwise Pearson correlation of revenue, expenses, profit and margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: [[f64; 4]; 4],
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }
}

// ---------------------------------------------------------------------------
// Shaping functions
// ---------------------------------------------------------------------------

pub fn trend_series(rows: &[MonthlyRecord]) -> Vec<TrendPoint> {
    rows.iter()
        .map(|r| TrendPoint {
            date: r.date,
            revenue: r.revenue,
            expenses: r.expenses,
            profit_margin: r.profit_margin,
            net_cash_flow: r.net_cash_flow,
        })
        .collect()
}

/// Summed revenue, expenses and profit per department present in `rows`.
pub fn department_summary(rows: &[DepartmentRecord]) -> Vec<DepartmentTotals> {
    let mut totals: BTreeMap<Department, DepartmentTotals> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry(row.department).or_insert(DepartmentTotals {
            department: row.department,
            revenue: 0.0,
            expenses: 0.0,
            profit: 0.0,
        });
        entry.revenue += row.revenue;
        entry.expenses += row.expenses;
        entry.profit += row.profit;
    }
    totals.into_values().collect()
}

/// Cash flow split of the latest filtered month (latest base month when the
/// filtered table is empty).
pub fn cash_flow_components(
    filtered: &[MonthlyRecord],
    base: &[MonthlyRecord],
) -> Vec<CashFlowComponent> {
    let Some(latest) = latest_record(filtered, base) else {
        return Vec::new();
    };
    [
        ("Operating", latest.operating_cash_flow),
        ("Investing", latest.investing_cash_flow),
        ("Financing", latest.financing_cash_flow),
    ]
    .into_iter()
    .map(|(category, amount)| CashFlowComponent {
        category: category.to_string(),
        amount,
    })
    .collect()
}

pub fn margin_heatmap(rows: &[MonthlyRecord]) -> MarginHeatmap {
    // (sum, count) per year and month index
    let mut cells: BTreeMap<i32, [(f64, u32); 12]> = BTreeMap::new();
    for r in rows {
        let year = cells.entry(r.date.year()).or_insert([(0.0, 0); 12]);
        let cell = &mut year[r.date.month0() as usize];
        cell.0 += r.profit_margin;
        cell.1 += 1;
    }

    let rows = cells
        .into_iter()
        .map(|(year, months)| HeatmapRow {
            year,
            values: months.map(|(sum, count)| safe_div(sum, count as f64)),
        })
        .collect();

    MarginHeatmap {
        columns: MONTH_ABBREVIATIONS.iter().map(|m| m.to_string()).collect(),
        rows,
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return 0.0;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    safe_div(cov, (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Correlation among revenue, expenses, profit and profit margin. Pairs
/// involving a constant series, or fewer than two rows, are 0.
pub fn correlation_matrix(rows: &[MonthlyRecord]) -> CorrelationMatrix {
    let columns: [Vec<f64>; 4] = [
        rows.iter().map(|r| r.revenue).collect(),
        rows.iter().map(|r| r.expenses).collect(),
        rows.iter().map(|r| r.profit).collect(),
        rows.iter().map(|r| r.profit_margin).collect(),
    ];

    let mut values = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in i..4 {
            let c = pearson(&columns[i], &columns[j]);
            values[i][j] = c;
            values[j][i] = c;
        }
    }

    CorrelationMatrix {
        labels: CORRELATION_FIELDS.iter().map(|f| f.to_string()).collect(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
