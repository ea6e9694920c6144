pub mod dashboard;
pub mod export;

use chrono::NaiveDate;
use clap::Args;
use fincontrol_core::analytics::TimeWindow;
use fincontrol_core::dashboard::{DashboardInput, DEFAULT_SEED};
use fincontrol_core::Department;
use tracing::debug;

use crate::input;

/// Slider range of the scenario inputs, in percent.
const SCENARIO_LIMIT: f64 = 20.0;

/// Arguments shared by every command that builds a dashboard session.
#[derive(Args)]
pub struct ViewArgs {
    /// Path to a JSON/YAML file holding a full dashboard input (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Seed for the synthetic data generator
    #[arg(long, env = "FINCONTROL_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of trailing month-ends to generate
    #[arg(long, default_value_t = 12)]
    pub months: usize,

    /// Last day of the generated span (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Time window: "Last 3 Months", "Last 6 Months", "Last 12 Months", "All Time" (or 3m, 6m, 12m, all)
    #[arg(long, default_value = "Last 12 Months")]
    pub window: TimeWindow,

    /// Comma-separated departments (e.g. "Sales,R&D"), defaults to all
    #[arg(long, value_delimiter = ',')]
    pub departments: Option<Vec<Department>>,

    /// Revenue what-if delta in percent (-20 to 20)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub revenue_scenario: f64,

    /// Expense what-if delta in percent (-20 to 20)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub expense_scenario: f64,
}

impl ViewArgs {
    /// Input file first, then piped stdin, then the individual flags.
    pub fn resolve(&self) -> Result<DashboardInput, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            debug!(path = %path, "reading dashboard input from file");
            return input::file::read_input(path);
        }
        if let Some(value) = input::stdin::read_stdin()? {
            debug!("reading dashboard input from stdin");
            return Ok(serde_json::from_value(value)?);
        }
        self.session_from_flags()
    }

    fn session_from_flags(&self) -> Result<DashboardInput, Box<dyn std::error::Error>> {
        for (flag, pct) in [
            ("--revenue-scenario", self.revenue_scenario),
            ("--expense-scenario", self.expense_scenario),
        ] {
            if !(-SCENARIO_LIMIT..=SCENARIO_LIMIT).contains(&pct) {
                return Err(format!(
                    "{flag} must be between -{SCENARIO_LIMIT} and {SCENARIO_LIMIT}, got {pct}"
                )
                .into());
            }
        }

        let mut session = DashboardInput::with_seed(self.seed);
        session.generator.month_count = self.months;
        session.generator.as_of = self.as_of;
        session.view.time_window = self.window;
        if let Some(ref departments) = self.departments {
            session.view.departments = departments.clone();
        }
        session.view.revenue_scenario_pct = self.revenue_scenario;
        session.view.expense_scenario_pct = self.expense_scenario;
        Ok(session)
    }
}
