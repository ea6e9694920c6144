use napi::Result as NapiResult;
use napi_derive::napi;

use fincontrol_core::dashboard::{self, DashboardInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// An empty string means every default (seed 42, 12 months, today).
fn parse_input(input_json: &str) -> NapiResult<DashboardInput> {
    DashboardInput::from_json(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_dataset(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = dashboard::run_generate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi(js_name = "dashboard")]
pub fn run_dashboard(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = dashboard::run_dashboard(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[napi]
pub fn format_currency(value: f64) -> String {
    fincontrol_core::format::currency_format(value)
}
