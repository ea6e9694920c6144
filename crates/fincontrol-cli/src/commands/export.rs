use clap::Args;
use fincontrol_core::dashboard::run_dashboard;
use fincontrol_core::export::write_to_dir;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::ViewArgs;

/// Arguments for exporting the filtered tables as CSV
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Directory receiving financial_main_data.csv and financial_department_data.csv
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if !args.dir.is_dir() {
        return Err(format!("Not a directory: {}", args.dir.display()).into());
    }

    let session = args.view.resolve()?;
    let output = run_dashboard(&session)?;
    let view = &output.result.view;

    let (monthly_path, department_path) =
        write_to_dir(&args.dir, &view.filtered_monthly, &view.filtered_department)?;

    Ok(json!({
        "result": {
            "monthly_path": monthly_path.display().to_string(),
            "department_path": department_path.display().to_string(),
            "monthly_rows": view.filtered_monthly.len(),
            "department_rows": view.filtered_department.len(),
        },
        "methodology": "CSV export of the filtered monthly and department tables",
        "warnings": output.warnings,
    }))
}
