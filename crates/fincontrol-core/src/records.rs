use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::FinControlError;
use crate::types::{safe_div, Money, Rate};
use crate::FinControlResult;

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// Business unit of the synthetic company. Declaration order is generation
/// order and the order used by every per-department summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Sales,
    Marketing,
    #[serde(rename = "R&D")]
    ResearchAndDevelopment,
    Operations,
    Administration,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Sales,
        Department::Marketing,
        Department::ResearchAndDevelopment,
        Department::Operations,
        Department::Administration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Sales => "Sales",
            Department::Marketing => "Marketing",
            Department::ResearchAndDevelopment => "R&D",
            Department::Operations => "Operations",
            Department::Administration => "Administration",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = FinControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match key.as_str() {
            "sales" => Ok(Department::Sales),
            "marketing" => Ok(Department::Marketing),
            "r&d" | "rd" | "rnd" | "randd" | "researchanddevelopment" => {
                Ok(Department::ResearchAndDevelopment)
            }
            "operations" | "ops" => Ok(Department::Operations),
            "administration" | "admin" => Ok(Department::Administration),
            _ => Err(FinControlError::invalid(
                "department",
                format!("Unknown department '{s}'"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly (company-level) record
// ---------------------------------------------------------------------------

/// Raw per-month figures a [`MonthlyRecord`] is derived from. Profit,
/// margins and net cash flow are never supplied directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyInputs {
    pub date: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    pub budget_revenue: Money,
    pub budget_expenses: Money,
    pub operating_cash_flow: Money,
    pub investing_cash_flow: Money,
    pub financing_cash_flow: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
}

/// One calendar month of company-level actuals, budget, cash flow and
/// working capital. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Month-end date
    pub date: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    /// revenue - expenses
    pub profit: Money,
    /// profit / revenue, 0 when revenue is 0
    pub profit_margin: Rate,
    pub budget_revenue: Money,
    pub budget_expenses: Money,
    pub budget_profit: Money,
    pub budget_profit_margin: Rate,
    pub operating_cash_flow: Money,
    pub investing_cash_flow: Money,
    pub financing_cash_flow: Money,
    /// operating + investing + financing
    pub net_cash_flow: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
}

impl MonthlyRecord {
    pub fn from_inputs(inputs: &MonthlyInputs) -> Self {
        let profit = inputs.revenue - inputs.expenses;
        let budget_profit = inputs.budget_revenue - inputs.budget_expenses;
        MonthlyRecord {
            date: inputs.date,
            revenue: inputs.revenue,
            expenses: inputs.expenses,
            profit,
            profit_margin: safe_div(profit, inputs.revenue),
            budget_revenue: inputs.budget_revenue,
            budget_expenses: inputs.budget_expenses,
            budget_profit,
            budget_profit_margin: safe_div(budget_profit, inputs.budget_revenue),
            operating_cash_flow: inputs.operating_cash_flow,
            investing_cash_flow: inputs.investing_cash_flow,
            financing_cash_flow: inputs.financing_cash_flow,
            net_cash_flow: inputs.operating_cash_flow
                + inputs.investing_cash_flow
                + inputs.financing_cash_flow,
            current_assets: inputs.current_assets,
            current_liabilities: inputs.current_liabilities,
        }
    }

    /// Copy of this record with revenue and expenses scaled by the given
    /// factors. Profit and margin follow; budget, cash flow and working
    /// capital are carried over untouched.
    pub fn with_scenario(&self, revenue_factor: f64, expense_factor: f64) -> Self {
        let revenue = self.revenue * revenue_factor;
        let expenses = self.expenses * expense_factor;
        let profit = revenue - expenses;
        MonthlyRecord {
            revenue,
            expenses,
            profit,
            profit_margin: safe_div(profit, revenue),
            ..self.clone()
        }
    }

    /// "September 2026"
    pub fn month_label(&self) -> String {
        self.date.format("%B %Y").to_string()
    }
}

// ---------------------------------------------------------------------------
// Department record
// ---------------------------------------------------------------------------

/// One (month, department) slice of the company figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub date: NaiveDate,
    pub department: Department,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
    pub budget_revenue: Money,
    pub budget_expenses: Money,
    pub budget_profit: Money,
}

impl DepartmentRecord {
    pub fn new(
        date: NaiveDate,
        department: Department,
        revenue: Money,
        expenses: Money,
        budget_revenue: Money,
        budget_expenses: Money,
    ) -> Self {
        DepartmentRecord {
            date,
            department,
            revenue,
            expenses,
            profit: revenue - expenses,
            budget_revenue,
            budget_expenses,
            budget_profit: budget_revenue - budget_expenses,
        }
    }

    pub fn month_label(&self) -> String {
        self.date.format("%B %Y").to_string()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The two immutable base tables of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    monthly: Vec<MonthlyRecord>,
    department: Vec<DepartmentRecord>,
}

impl Dataset {
    /// Assemble a dataset, checking that monthly dates are strictly
    /// ascending and that (date, department) keys are unique.
    pub fn new(
        monthly: Vec<MonthlyRecord>,
        department: Vec<DepartmentRecord>,
    ) -> FinControlResult<Self> {
        if let Some(pair) = monthly.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(FinControlError::invalid(
                "monthly",
                format!(
                    "Dates must be strictly ascending ({} followed by {})",
                    pair[0].date, pair[1].date
                ),
            ));
        }

        let mut seen = HashSet::with_capacity(department.len());
        for row in &department {
            if !seen.insert((row.date, row.department)) {
                return Err(FinControlError::invalid(
                    "department",
                    format!("Duplicate row for {} on {}", row.department, row.date),
                ));
            }
        }

        Ok(Dataset {
            monthly,
            department,
        })
    }

    pub fn monthly(&self) -> &[MonthlyRecord] {
        &self.monthly
    }

    pub fn department(&self) -> &[DepartmentRecord] {
        &self.department
    }

    /// Most recent monthly record.
    pub fn latest(&self) -> Option<&MonthlyRecord> {
        self.monthly.last()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(d: NaiveDate) -> MonthlyInputs {
        MonthlyInputs {
            date: d,
            revenue: 1_000_000.0,
            expenses: 650_000.0,
            budget_revenue: 1_080_000.0,
            budget_expenses: 640_000.0,
            operating_cash_flow: 350_000.0,
            investing_cash_flow: -130_000.0,
            financing_cash_flow: 20_000.0,
            current_assets: 400_000.0,
            current_liabilities: 195_000.0,
        }
    }

    #[test]
    fn test_record_derives_profit_and_net_cash_flow() {
        let r = MonthlyRecord::from_inputs(&inputs(date(2026, 1, 31)));
        assert_eq!(r.profit, 350_000.0);
        assert_eq!(r.profit_margin, 0.35);
        assert_eq!(r.budget_profit, 440_000.0);
        assert_eq!(r.net_cash_flow, 240_000.0);
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let mut i = inputs(date(2026, 1, 31));
        i.revenue = 0.0;
        i.budget_revenue = 0.0;
        let r = MonthlyRecord::from_inputs(&i);
        assert_eq!(r.profit_margin, 0.0);
        assert_eq!(r.budget_profit_margin, 0.0);
    }

    #[test]
    fn test_scenario_leaves_cash_flow_alone() {
        let r = MonthlyRecord::from_inputs(&inputs(date(2026, 1, 31)));
        let s = r.with_scenario(1.1, 0.9);
        assert_eq!(s.revenue, 1_000_000.0 * 1.1);
        assert_eq!(s.expenses, 650_000.0 * 0.9);
        assert_eq!(s.profit, s.revenue - s.expenses);
        assert_eq!(s.operating_cash_flow, r.operating_cash_flow);
        assert_eq!(s.net_cash_flow, r.net_cash_flow);
        assert_eq!(s.budget_revenue, r.budget_revenue);
    }

    #[test]
    fn test_month_label() {
        let r = MonthlyRecord::from_inputs(&inputs(date(2026, 9, 30)));
        assert_eq!(r.month_label(), "September 2026");
    }

    #[test]
    fn test_department_parsing() {
        assert_eq!("sales".parse::<Department>().unwrap(), Department::Sales);
        assert_eq!(
            "R&D".parse::<Department>().unwrap(),
            Department::ResearchAndDevelopment
        );
        assert_eq!(
            "r_and_d".parse::<Department>().unwrap(),
            Department::ResearchAndDevelopment
        );
        assert!("Legal".parse::<Department>().is_err());
    }

    #[test]
    fn test_department_serializes_display_name() {
        let json = serde_json::to_string(&Department::ResearchAndDevelopment).unwrap();
        assert_eq!(json, "\"R&D\"");
    }

    #[test]
    fn test_dataset_rejects_unsorted_dates() {
        let a = MonthlyRecord::from_inputs(&inputs(date(2026, 2, 28)));
        let b = MonthlyRecord::from_inputs(&inputs(date(2026, 1, 31)));
        let err = Dataset::new(vec![a, b], vec![]).unwrap_err();
        assert!(matches!(err, FinControlError::InvalidArgument { .. }));
    }

    #[test]
    fn test_dataset_rejects_duplicate_department_rows() {
        let d = date(2026, 1, 31);
        let row = DepartmentRecord::new(d, Department::Sales, 1.0, 1.0, 1.0, 1.0);
        let err = Dataset::new(vec![], vec![row.clone(), row]).unwrap_err();
        assert!(matches!(err, FinControlError::InvalidArgument { .. }));
    }
}
