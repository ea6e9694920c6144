use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Normal, Uniform};
use std::f64::consts::PI;
use tracing::debug;

use crate::calendar::trailing_month_ends;
use crate::error::FinControlError;
use crate::records::{Dataset, Department, DepartmentRecord, MonthlyInputs, MonthlyRecord};
use crate::types::Money;
use crate::FinControlResult;

/// Upper bound on the generated span (50 years of monthly rows).
pub const MAX_MONTHS: usize = 600;

pub const DEFAULT_MONTHS: usize = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Closed-open range for a uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: f64,
    pub max: f64,
}

impl UniformRange {
    pub const fn new(min: f64, max: f64) -> Self {
        UniformRange { min, max }
    }
}

/// Parameters of the synthetic company. Every field has a default, so a
/// partial JSON object is enough to override a single knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of trailing month-ends to generate.
    pub month_count: usize,
    /// Last day of the span. `None` means today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    /// Revenue level before trend, seasonality and noise.
    pub base_revenue: Money,
    /// Trend multiplier at the first month.
    pub trend_start: f64,
    /// Trend multiplier at the last month.
    pub trend_end: f64,
    /// Peak deviation of the seasonal sinusoid.
    pub seasonal_amplitude: f64,
    /// Full sine cycles across the span.
    pub seasonal_cycles: f64,
    /// Std-dev of the multiplicative revenue noise (mean 1).
    pub revenue_noise_std: f64,
    pub budget_revenue_multiplier: UniformRange,
    /// Expenses as a fraction of revenue.
    pub expense_ratio: UniformRange,
    /// Std-dev of the multiplicative expense noise (mean 1).
    pub expense_noise_std: f64,
    pub budget_expense_multiplier: UniformRange,
    /// Operating cash flow as a fraction of profit.
    pub operating_cash_flow_ratio: UniformRange,
    /// Investing outflow as a fraction of expenses (sign is negated).
    pub investing_cash_flow_ratio: UniformRange,
    /// Financing cash flow as a fraction of profit.
    pub financing_cash_flow_ratio: UniformRange,
    /// Current assets as a fraction of revenue.
    pub current_assets_ratio: UniformRange,
    /// Current liabilities as a fraction of expenses.
    pub current_liabilities_ratio: UniformRange,
    /// Department revenue as a fraction of the month's company revenue.
    pub department_revenue_share: UniformRange,
    /// Department expenses as a fraction of the month's company expenses.
    pub department_expense_share: UniformRange,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            month_count: DEFAULT_MONTHS,
            as_of: None,
            base_revenue: 1_000_000.0,
            trend_start: 0.9,
            trend_end: 1.2,
            seasonal_amplitude: 0.1,
            seasonal_cycles: 2.0,
            revenue_noise_std: 0.05,
            budget_revenue_multiplier: UniformRange::new(1.05, 1.10),
            expense_ratio: UniformRange::new(0.60, 0.70),
            expense_noise_std: 0.03,
            budget_expense_multiplier: UniformRange::new(0.95, 1.00),
            operating_cash_flow_ratio: UniformRange::new(0.8, 1.2),
            investing_cash_flow_ratio: UniformRange::new(0.1, 0.3),
            financing_cash_flow_ratio: UniformRange::new(-0.2, 0.2),
            current_assets_ratio: UniformRange::new(0.3, 0.5),
            current_liabilities_ratio: UniformRange::new(0.2, 0.4),
            department_revenue_share: UniformRange::new(0.10, 0.30),
            department_expense_share: UniformRange::new(0.15, 0.25),
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

fn normal(field: &str, mean: f64, std_dev: f64) -> FinControlResult<Normal> {
    Normal::new(mean, std_dev).map_err(|e| {
        FinControlError::invalid(field, format!("Invalid Normal parameters: {e}"))
    })
}

fn uniform(field: &str, range: UniformRange) -> FinControlResult<Uniform> {
    if range.min >= range.max {
        return Err(FinControlError::invalid(
            field,
            format!("min ({}) must be below max ({})", range.min, range.max),
        ));
    }
    Uniform::new(range.min, range.max).map_err(|e| {
        FinControlError::invalid(field, format!("Invalid Uniform parameters: {e}"))
    })
}

/// `n` draws of N(1, std_dev).
fn draw_noise(rng: &mut StdRng, field: &str, std_dev: f64, n: usize) -> FinControlResult<Vec<f64>> {
    let dist = normal(field, 1.0, std_dev)?;
    Ok((0..n).map(|_| rng.sample(&dist)).collect())
}

/// `n` draws of U(range.min, range.max).
fn draw_uniform(
    rng: &mut StdRng,
    field: &str,
    range: UniformRange,
    n: usize,
) -> FinControlResult<Vec<f64>> {
    let dist = uniform(field, range)?;
    Ok((0..n).map(|_| rng.sample(&dist)).collect())
}

/// `n` evenly spaced points from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &GeneratorConfig) -> FinControlResult<()> {
    if config.month_count == 0 {
        return Err(FinControlError::invalid(
            "month_count",
            "Must be at least 1",
        ));
    }
    if config.month_count > MAX_MONTHS {
        return Err(FinControlError::invalid(
            "month_count",
            format!("Must be at most {MAX_MONTHS}"),
        ));
    }
    if !config.base_revenue.is_finite() || config.base_revenue <= 0.0 {
        return Err(FinControlError::invalid(
            "base_revenue",
            "Must be a positive amount",
        ));
    }
    for (field, value) in [
        ("trend_start", config.trend_start),
        ("trend_end", config.trend_end),
        ("seasonal_amplitude", config.seasonal_amplitude),
        ("seasonal_cycles", config.seasonal_cycles),
    ] {
        if !value.is_finite() {
            return Err(FinControlError::invalid(field, "Must be finite"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the monthly and department tables.
///
/// Revenue is `base × trend(i) × seasonal(i) × noise(i)`: a linear ramp
/// from `trend_start` to `trend_end`, a sinusoid with `seasonal_cycles`
/// full periods over the span, and N(1, `revenue_noise_std`) jitter.
/// Budgets, expenses, cash flow and working capital are randomized
/// fractions of those figures. Each series is drawn in full before the
/// next one, then department rows month by month, so the same RNG state
/// and config always give the same tables.
pub fn generate(rng: &mut StdRng, config: &GeneratorConfig) -> FinControlResult<Dataset> {
    validate(config)?;

    let as_of = config
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let dates = trailing_month_ends(as_of, config.month_count).ok_or_else(|| {
        FinControlError::invalid("as_of", format!("Cannot build month span ending {as_of}"))
    })?;
    let n = dates.len();

    let trend = linspace(config.trend_start, config.trend_end, n);
    let phase = linspace(0.0, config.seasonal_cycles * 2.0 * PI, n);
    let revenue_noise = draw_noise(rng, "revenue_noise_std", config.revenue_noise_std, n)?;

    let revenue: Vec<f64> = (0..n)
        .map(|i| {
            let seasonal = phase[i].sin() * config.seasonal_amplitude + 1.0;
            config.base_revenue * trend[i] * seasonal * revenue_noise[i]
        })
        .collect();

    let budget_rev_mult = draw_uniform(
        rng,
        "budget_revenue_multiplier",
        config.budget_revenue_multiplier,
        n,
    )?;
    let expense_ratio = draw_uniform(rng, "expense_ratio", config.expense_ratio, n)?;
    let expense_noise = draw_noise(rng, "expense_noise_std", config.expense_noise_std, n)?;
    let expenses: Vec<f64> = (0..n)
        .map(|i| revenue[i] * expense_ratio[i] * expense_noise[i])
        .collect();
    let budget_exp_mult = draw_uniform(
        rng,
        "budget_expense_multiplier",
        config.budget_expense_multiplier,
        n,
    )?;

    let operating = draw_uniform(
        rng,
        "operating_cash_flow_ratio",
        config.operating_cash_flow_ratio,
        n,
    )?;
    let investing = draw_uniform(
        rng,
        "investing_cash_flow_ratio",
        config.investing_cash_flow_ratio,
        n,
    )?;
    let financing = draw_uniform(
        rng,
        "financing_cash_flow_ratio",
        config.financing_cash_flow_ratio,
        n,
    )?;
    let assets = draw_uniform(rng, "current_assets_ratio", config.current_assets_ratio, n)?;
    let liabilities = draw_uniform(
        rng,
        "current_liabilities_ratio",
        config.current_liabilities_ratio,
        n,
    )?;

    let monthly: Vec<MonthlyRecord> = (0..n)
        .map(|i| {
            let profit = revenue[i] - expenses[i];
            MonthlyRecord::from_inputs(&MonthlyInputs {
                date: dates[i],
                revenue: revenue[i],
                expenses: expenses[i],
                budget_revenue: revenue[i] * budget_rev_mult[i],
                budget_expenses: expenses[i] * budget_exp_mult[i],
                operating_cash_flow: profit * operating[i],
                investing_cash_flow: -expenses[i] * investing[i],
                financing_cash_flow: profit * financing[i],
                current_assets: revenue[i] * assets[i],
                current_liabilities: expenses[i] * liabilities[i],
            })
        })
        .collect();

    let revenue_share = uniform("department_revenue_share", config.department_revenue_share)?;
    let expense_share = uniform("department_expense_share", config.department_expense_share)?;
    let budget_rev = uniform("budget_revenue_multiplier", config.budget_revenue_multiplier)?;
    let budget_exp = uniform("budget_expense_multiplier", config.budget_expense_multiplier)?;

    let mut department = Vec::with_capacity(n * Department::ALL.len());
    for month in &monthly {
        for dept in Department::ALL {
            let rev_frac: f64 = rng.sample(&revenue_share);
            let exp_frac: f64 = rng.sample(&expense_share);
            let budget_rev_frac: f64 = rng.sample(&budget_rev);
            let budget_exp_frac: f64 = rng.sample(&budget_exp);
            let dept_revenue = month.revenue * rev_frac;
            let dept_expenses = month.expenses * exp_frac;
            let dept_budget_revenue = dept_revenue * budget_rev_frac;
            let dept_budget_expenses = dept_expenses * budget_exp_frac;
            department.push(DepartmentRecord::new(
                month.date,
                dept,
                dept_revenue,
                dept_expenses,
                dept_budget_revenue,
                dept_budget_expenses,
            ));
        }
    }

    debug!(
        months = n,
        department_rows = department.len(),
        first = %dates[0],
        last = %dates[n - 1],
        "generated synthetic financial dataset"
    );

    Dataset::new(monthly, department)
}

/// Generate from a fresh `StdRng` seeded with `seed`, using the default
/// parameters for everything except the span.
pub fn generate_seeded(
    seed: u64,
    month_count: usize,
    as_of: Option<NaiveDate>,
) -> FinControlResult<Dataset> {
    let config = GeneratorConfig {
        month_count,
        as_of,
        ..GeneratorConfig::default()
    };
    debug!(seed, month_count, "seeding generator");
    let mut rng = StdRng::seed_from_u64(seed);
    generate(&mut rng, &config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    fn as_of() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 10, 19)
    }

    #[test]
    fn test_default_span_is_twelve_month_ends() {
        let ds = generate_seeded(SEED, 12, as_of()).unwrap();
        assert_eq!(ds.monthly().len(), 12);
        assert_eq!(ds.department().len(), 60);
        assert_eq!(
            ds.monthly()[0].date,
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
        );
        assert_eq!(
            ds.latest().unwrap().date,
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap()
        );
    }

    #[test]
    fn test_seeded_reproducibility() {
        let a = generate_seeded(SEED, 12, as_of()).unwrap();
        let b = generate_seeded(SEED, 12, as_of()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_seeded(1, 12, as_of()).unwrap();
        let b = generate_seeded(2, 12, as_of()).unwrap();
        assert_ne!(a.monthly()[0].revenue, b.monthly()[0].revenue);
    }

    #[test]
    fn test_zero_months_rejected() {
        let err = generate_seeded(SEED, 0, as_of()).unwrap_err();
        match err {
            FinControlError::InvalidArgument { field, .. } => assert_eq!(field, "month_count"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_many_months_rejected() {
        assert!(generate_seeded(SEED, MAX_MONTHS + 1, as_of()).is_err());
    }

    #[test]
    fn test_single_month_span() {
        let ds = generate_seeded(SEED, 1, as_of()).unwrap();
        assert_eq!(ds.monthly().len(), 1);
        assert_eq!(ds.department().len(), 5);
    }

    #[test]
    fn test_budget_bands() {
        let ds = generate_seeded(SEED, 24, as_of()).unwrap();
        for r in ds.monthly() {
            assert!(r.budget_revenue >= r.revenue * 1.05 - 1e-6);
            assert!(r.budget_revenue <= r.revenue * 1.10 + 1e-6);
            assert!(r.budget_expenses <= r.expenses + 1e-6);
            assert!(r.budget_expenses >= r.expenses * 0.95 - 1e-6);
        }
    }

    #[test]
    fn test_cash_flow_signs() {
        let ds = generate_seeded(SEED, 24, as_of()).unwrap();
        for r in ds.monthly() {
            assert!(r.investing_cash_flow < 0.0);
            assert!(r.current_assets > 0.0);
            assert!(r.current_liabilities > 0.0);
        }
    }

    #[test]
    fn test_department_shares_within_bounds() {
        let ds = generate_seeded(SEED, 12, as_of()).unwrap();
        for row in ds.department() {
            let month = ds.monthly().iter().find(|m| m.date == row.date).unwrap();
            let rev_share = row.revenue / month.revenue;
            let exp_share = row.expenses / month.expenses;
            assert!((0.10..0.30 + 1e-9).contains(&rev_share), "share={rev_share}");
            assert!((0.15..0.25 + 1e-9).contains(&exp_share), "share={exp_share}");
        }
    }

    #[test]
    fn test_upward_trend_without_noise() {
        let config = GeneratorConfig {
            as_of: as_of(),
            seasonal_amplitude: 0.0,
            revenue_noise_std: 1e-12,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(SEED);
        let ds = generate(&mut rng, &config).unwrap();
        let first = ds.monthly()[0].revenue;
        let last = ds.latest().unwrap().revenue;
        assert!((first - 900_000.0).abs() < 1e-3, "first={first}");
        assert!((last - 1_200_000.0).abs() < 1e-3, "last={last}");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = GeneratorConfig {
            as_of: as_of(),
            expense_ratio: UniformRange::new(0.7, 0.6),
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(SEED);
        let err = generate(&mut rng, &config).unwrap_err();
        assert!(matches!(err, FinControlError::InvalidArgument { .. }));
    }

    #[test]
    fn test_negative_noise_rejected() {
        let config = GeneratorConfig {
            as_of: as_of(),
            revenue_noise_std: -0.1,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(SEED);
        assert!(generate(&mut rng, &config).is_err());
    }

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.9, 1.2, 4);
        assert_eq!(v[0], 0.9);
        assert!((v[3] - 1.2).abs() < 1e-12);
        assert_eq!(linspace(0.9, 1.2, 1), vec![0.9]);
    }
}
