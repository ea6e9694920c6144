use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::analytics::charts::{
    correlation_matrix, margin_heatmap, trend_series, CorrelationMatrix, MarginHeatmap, TrendPoint,
};
use crate::analytics::view::{apply_view, DashboardView, ViewConfig};
use crate::records::Dataset;
use crate::synthetic::generator::{generate, GeneratorConfig};
use crate::types::{with_metadata, ComputationOutput};
use crate::FinControlResult;

pub const DEFAULT_SEED: u64 = 42;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One dashboard session: how to generate the data and how to look at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInput {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Default for DashboardInput {
    fn default() -> Self {
        DashboardInput {
            seed: DEFAULT_SEED,
            generator: GeneratorConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl DashboardInput {
    /// Parse a session from JSON. Blank input means every default.
    pub fn from_json(json: &str) -> FinControlResult<Self> {
        if json.trim().is_empty() {
            return Ok(DashboardInput::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_seed(seed: u64) -> Self {
        DashboardInput {
            seed,
            ..DashboardInput::default()
        }
    }
}

/// Series for the chart tabs.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub trend: Vec<TrendPoint>,
    pub margin_heatmap: MarginHeatmap,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOutput {
    #[serde(flatten)]
    pub view: DashboardView,
    pub charts: ChartData,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the base tables for a session.
pub fn build_dataset(input: &DashboardInput) -> FinControlResult<Dataset> {
    let mut rng = StdRng::seed_from_u64(input.seed);
    generate(&mut rng, &input.generator)
}

/// Generate the base tables and wrap them in the computation envelope.
pub fn run_generate(input: &DashboardInput) -> FinControlResult<ComputationOutput<Dataset>> {
    let start = Instant::now();
    let dataset = build_dataset(input)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Synthetic financial data (trend × seasonality × Gaussian noise)",
        &serde_json::json!({
            "seed": input.seed,
            "generator": input.generator,
            "period_start": dataset.monthly().first().map(|r| r.date),
            "period_end": dataset.latest().map(|r| r.date),
        }),
        vec![synthetic_warning(input.seed)],
        elapsed,
        dataset,
    ))
}

/// Generate, filter, apply the scenario and shape every chart in one pass.
pub fn run_dashboard(input: &DashboardInput) -> FinControlResult<ComputationOutput<DashboardOutput>> {
    let start = Instant::now();
    let dataset = build_dataset(input)?;
    let view = apply_view(&dataset, &input.view)?;
    let warnings = view_warnings(&dataset, input);

    let charts = ChartData {
        trend: trend_series(&view.filtered_monthly),
        margin_heatmap: margin_heatmap(&view.filtered_monthly),
        correlation: correlation_matrix(&view.filtered_monthly),
    };

    info!(
        seed = input.seed,
        window = %input.view.time_window,
        rows = view.filtered_monthly.len(),
        "dashboard computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Financial Controlling Dashboard (KPIs, ratios, scenario analysis)",
        &serde_json::json!({
            "seed": input.seed,
            "month_count": input.generator.month_count,
            "period_end": dataset.latest().map(|r| r.date),
            "time_window": input.view.time_window,
            "departments": input.view.departments,
            "revenue_scenario_pct": input.view.revenue_scenario_pct,
            "expense_scenario_pct": input.view.expense_scenario_pct,
        }),
        warnings,
        elapsed,
        DashboardOutput { view, charts },
    ))
}

fn synthetic_warning(seed: u64) -> String {
    format!("Figures are synthetic, generated from seed {seed}")
}

fn view_warnings(dataset: &Dataset, input: &DashboardInput) -> Vec<String> {
    let mut warnings = vec![synthetic_warning(input.seed)];

    if input.view.scenario_active() {
        warnings.push(format!("Scenario active: {}", input.view.scenario_label()));
    }
    if let Some(months) = input.view.time_window.months() {
        let available = dataset.monthly().len();
        if months as usize > available {
            warnings.push(format!(
                "{} exceeds the {available} generated months; showing all of them",
                input.view.time_window
            ));
        }
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
