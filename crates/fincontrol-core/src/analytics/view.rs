use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::analytics::kpi::{compute_aggregates, Aggregates};
use crate::calendar::month_end_before;
use crate::error::FinControlError;
use crate::records::{Dataset, Department, DepartmentRecord, MonthlyRecord};
use crate::types::Pct;
use crate::FinControlResult;

/// Largest scenario delta accepted in either direction, in percent.
pub const MAX_SCENARIO_PCT: Pct = 100.0;

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// Trailing window over the monthly series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    Last3Months,
    Last6Months,
    #[default]
    Last12Months,
    AllTime,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Last3Months,
        TimeWindow::Last6Months,
        TimeWindow::Last12Months,
        TimeWindow::AllTime,
    ];

    /// Window length in months; `None` for all time.
    pub fn months(&self) -> Option<u32> {
        match self {
            TimeWindow::Last3Months => Some(3),
            TimeWindow::Last6Months => Some(6),
            TimeWindow::Last12Months => Some(12),
            TimeWindow::AllTime => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Last3Months => "Last 3 Months",
            TimeWindow::Last6Months => "Last 6 Months",
            TimeWindow::Last12Months => "Last 12 Months",
            TimeWindow::AllTime => "All Time",
        }
    }

    /// Exclusive lower bound on dates inside the window, given the latest
    /// date of the series. `None` keeps everything.
    pub fn cutoff(&self, latest: NaiveDate) -> Option<NaiveDate> {
        self.months().and_then(|m| month_end_before(latest, m))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeWindow {
    type Err = FinControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match key.as_str() {
            "last3months" | "3months" | "3m" => Ok(TimeWindow::Last3Months),
            "last6months" | "6months" | "6m" => Ok(TimeWindow::Last6Months),
            "last12months" | "12months" | "12m" => Ok(TimeWindow::Last12Months),
            "alltime" | "all" => Ok(TimeWindow::AllTime),
            _ => Err(FinControlError::invalid(
                "time_window",
                format!("Unknown time window '{s}'"),
            )),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = FinControlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(value: TimeWindow) -> Self {
        value.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// View configuration
// ---------------------------------------------------------------------------

fn all_departments() -> Vec<Department> {
    Department::ALL.to_vec()
}

/// Everything a dashboard interaction can change. Immutable; each change
/// produces a new value and a full recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub time_window: TimeWindow,
    /// Departments kept in the department table. Must not be empty.
    #[serde(default = "all_departments")]
    pub departments: Vec<Department>,
    /// What-if revenue delta in percent (10.0 = +10%).
    #[serde(default)]
    pub revenue_scenario_pct: Pct,
    /// What-if expense delta in percent.
    #[serde(default)]
    pub expense_scenario_pct: Pct,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            time_window: TimeWindow::default(),
            departments: all_departments(),
            revenue_scenario_pct: 0.0,
            expense_scenario_pct: 0.0,
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> FinControlResult<()> {
        if self.departments.is_empty() {
            return Err(FinControlError::invalid(
                "departments",
                "At least one department must be selected",
            ));
        }
        for (field, pct) in [
            ("revenue_scenario_pct", self.revenue_scenario_pct),
            ("expense_scenario_pct", self.expense_scenario_pct),
        ] {
            if !pct.is_finite() || pct.abs() > MAX_SCENARIO_PCT {
                return Err(FinControlError::invalid(
                    field,
                    format!("Must be between -{MAX_SCENARIO_PCT} and {MAX_SCENARIO_PCT}"),
                ));
            }
        }
        Ok(())
    }

    pub fn scenario_active(&self) -> bool {
        self.revenue_scenario_pct != 0.0 || self.expense_scenario_pct != 0.0
    }

    /// "Revenue +10%, Expenses -5%"
    pub fn scenario_label(&self) -> String {
        format!(
            "Revenue {:+.0}%, Expenses {:+.0}%",
            self.revenue_scenario_pct, self.expense_scenario_pct
        )
    }

    fn revenue_factor(&self) -> f64 {
        1.0 + self.revenue_scenario_pct / 100.0
    }

    fn expense_factor(&self) -> f64 {
        1.0 + self.expense_scenario_pct / 100.0
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Filtered tables plus everything derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filtered_monthly: Vec<MonthlyRecord>,
    pub filtered_department: Vec<DepartmentRecord>,
    pub aggregates: Aggregates,
}

/// Last row of the filtered table, or the base table's last row when the
/// window is empty.
pub fn latest_record<'a>(
    filtered: &'a [MonthlyRecord],
    base: &'a [MonthlyRecord],
) -> Option<&'a MonthlyRecord> {
    match filtered.last() {
        Some(r) => Some(r),
        None => {
            let fallback = base.last();
            if let Some(r) = fallback {
                warn!(date = %r.date, "filtered window is empty, using latest base record");
            }
            fallback
        }
    }
}

/// Apply a time window, department selection and scenario to the base
/// tables.
///
/// Scenario deltas scale revenue and expenses of the monthly rows and
/// recompute profit and margin only. Department rows are filtered but never
/// perturbed. The base tables are not modified.
pub fn apply_view(dataset: &Dataset, config: &ViewConfig) -> FinControlResult<DashboardView> {
    config.validate()?;

    let base = dataset.monthly();
    let latest = dataset.latest().ok_or_else(|| {
        FinControlError::InsufficientData("Dataset has no monthly records".into())
    })?;
    let cutoff = config.time_window.cutoff(latest.date);
    let in_window = |date: NaiveDate| cutoff.map_or(true, |c| date > c);

    let revenue_factor = config.revenue_factor();
    let expense_factor = config.expense_factor();
    let filtered_monthly: Vec<MonthlyRecord> = base
        .iter()
        .filter(|r| in_window(r.date))
        .map(|r| r.with_scenario(revenue_factor, expense_factor))
        .collect();

    let filtered_department: Vec<DepartmentRecord> = dataset
        .department()
        .iter()
        .filter(|r| in_window(r.date) && config.departments.contains(&r.department))
        .cloned()
        .collect();

    debug!(
        window = %config.time_window,
        monthly_rows = filtered_monthly.len(),
        department_rows = filtered_department.len(),
        revenue_scenario_pct = config.revenue_scenario_pct,
        expense_scenario_pct = config.expense_scenario_pct,
        "applied dashboard view"
    );

    let aggregates = compute_aggregates(base, &filtered_monthly, &filtered_department, config)?;

    Ok(DashboardView {
        filtered_monthly,
        filtered_department,
        aggregates,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
