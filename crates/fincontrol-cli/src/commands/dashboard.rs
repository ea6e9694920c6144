use fincontrol_core::analytics::charts::{correlation_matrix, margin_heatmap};
use fincontrol_core::dashboard::{self, DashboardOutput};
use fincontrol_core::format::{percent_format, ratio_format};
use fincontrol_core::ComputationOutput;
use serde_json::{json, Map, Value};

use super::ViewArgs;

/// Base tables exactly as generated, before any view is applied.
pub fn run_generate(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = args.resolve()?;
    let output = dashboard::run_generate(&session)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_dashboard(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = args.resolve()?;
    let output = dashboard::run_dashboard(&session)?;
    Ok(serde_json::to_value(output)?)
}

/// Ratio table of the latest month in the window, with printable cells.
pub fn run_ratios(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = compute(&args)?;
    let rows: Vec<Value> = output
        .result
        .view
        .aggregates
        .ratios
        .iter()
        .map(|row| {
            json!({
                "ratio": row.ratio.label(),
                "value": ratio_format(row.value),
                "target": ratio_format(row.target),
                "industry_avg": ratio_format(row.industry_avg),
                "status": row.status.to_string(),
            })
        })
        .collect();
    Ok(reshape(output, Value::Array(rows))?)
}

/// Average profit margin per year and calendar month.
pub fn run_heatmap(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = compute(&args)?;
    let heatmap = margin_heatmap(&output.result.view.filtered_monthly);

    let rows: Vec<Value> = heatmap
        .rows
        .iter()
        .map(|row| {
            let mut cells = Map::new();
            cells.insert("year".into(), json!(row.year));
            for (month, value) in heatmap.columns.iter().zip(row.values) {
                cells.insert(month.clone(), json!(percent_format(value)));
            }
            Value::Object(cells)
        })
        .collect();
    Ok(reshape(output, Value::Array(rows))?)
}

/// Pearson correlation among revenue, expenses, profit and margin.
pub fn run_correlation(args: ViewArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let output = compute(&args)?;
    let matrix = correlation_matrix(&output.result.view.filtered_monthly);

    let rows: Vec<Value> = matrix
        .labels
        .iter()
        .zip(matrix.values)
        .map(|(label, values)| {
            let mut cells = Map::new();
            cells.insert("field".into(), json!(label));
            for (other, value) in matrix.labels.iter().zip(values) {
                cells.insert(other.clone(), json!(format!("{value:.2}")));
            }
            Value::Object(cells)
        })
        .collect();
    Ok(reshape(output, Value::Array(rows))?)
}

fn compute(args: &ViewArgs) -> Result<ComputationOutput<DashboardOutput>, Box<dyn std::error::Error>> {
    let session = args.resolve()?;
    Ok(dashboard::run_dashboard(&session)?)
}

/// Keep the envelope of a dashboard run but swap in a narrower result.
fn reshape(
    output: ComputationOutput<DashboardOutput>,
    result: Value,
) -> Result<Value, serde_json::Error> {
    let narrowed = ComputationOutput {
        result,
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    serde_json::to_value(narrowed)
}
