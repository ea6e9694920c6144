use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::records::{Department, DepartmentRecord, MonthlyRecord};
use crate::FinControlResult;

pub const MONTHLY_FILE_NAME: &str = "financial_main_data.csv";
pub const DEPARTMENT_FILE_NAME: &str = "financial_department_data.csv";

/// Column order of the monthly export.
pub const MONTHLY_COLUMNS: [&str; 16] = [
    "date",
    "revenue",
    "expenses",
    "profit",
    "profit_margin",
    "budget_revenue",
    "budget_expenses",
    "budget_profit",
    "budget_profit_margin",
    "operating_cash_flow",
    "investing_cash_flow",
    "financing_cash_flow",
    "net_cash_flow",
    "current_assets",
    "current_liabilities",
    "month",
];

/// Column order of the department export.
pub const DEPARTMENT_COLUMNS: [&str; 9] = [
    "date",
    "department",
    "revenue",
    "expenses",
    "profit",
    "budget_revenue",
    "budget_expenses",
    "budget_profit",
    "month",
];

// ---------------------------------------------------------------------------
// Export rows
// ---------------------------------------------------------------------------

/// Amount rounded to cents, half away from zero. Non-finite values export
/// as 0.
pub fn to_cents(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rate rounded to four decimal places (basis-point precision).
pub fn to_rate(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyExportRow {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub profit_margin: Decimal,
    pub budget_revenue: Decimal,
    pub budget_expenses: Decimal,
    pub budget_profit: Decimal,
    pub budget_profit_margin: Decimal,
    pub operating_cash_flow: Decimal,
    pub investing_cash_flow: Decimal,
    pub financing_cash_flow: Decimal,
    pub net_cash_flow: Decimal,
    pub current_assets: Decimal,
    pub current_liabilities: Decimal,
    pub month: String,
}

/// Inputs are rounded first and the derived columns (profit, budget
/// profit, net cash flow) are summed from the rounded values, so the
/// exported identities hold to the cent.
impl From<&MonthlyRecord> for MonthlyExportRow {
    fn from(r: &MonthlyRecord) -> Self {
        let revenue = to_cents(r.revenue);
        let expenses = to_cents(r.expenses);
        let budget_revenue = to_cents(r.budget_revenue);
        let budget_expenses = to_cents(r.budget_expenses);
        let operating_cash_flow = to_cents(r.operating_cash_flow);
        let investing_cash_flow = to_cents(r.investing_cash_flow);
        let financing_cash_flow = to_cents(r.financing_cash_flow);
        MonthlyExportRow {
            date: r.date,
            revenue,
            expenses,
            profit: revenue - expenses,
            profit_margin: to_rate(r.profit_margin),
            budget_revenue,
            budget_expenses,
            budget_profit: budget_revenue - budget_expenses,
            budget_profit_margin: to_rate(r.budget_profit_margin),
            operating_cash_flow,
            investing_cash_flow,
            financing_cash_flow,
            net_cash_flow: operating_cash_flow + investing_cash_flow + financing_cash_flow,
            current_assets: to_cents(r.current_assets),
            current_liabilities: to_cents(r.current_liabilities),
            month: r.month_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentExportRow {
    pub date: NaiveDate,
    pub department: Department,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub budget_revenue: Decimal,
    pub budget_expenses: Decimal,
    pub budget_profit: Decimal,
    pub month: String,
}

impl From<&DepartmentRecord> for DepartmentExportRow {
    fn from(r: &DepartmentRecord) -> Self {
        let revenue = to_cents(r.revenue);
        let expenses = to_cents(r.expenses);
        let budget_revenue = to_cents(r.budget_revenue);
        let budget_expenses = to_cents(r.budget_expenses);
        DepartmentExportRow {
            date: r.date,
            department: r.department,
            revenue,
            expenses,
            profit: revenue - expenses,
            budget_revenue,
            budget_expenses,
            budget_profit: budget_revenue - budget_expenses,
            month: r.month_label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Header first, even for an empty table, then one row per record.
fn write_rows<W, T>(writer: W, columns: &[&str], rows: impl Iterator<Item = T>) -> FinControlResult<()>
where
    W: io::Write,
    T: Serialize,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(columns)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_monthly_csv<W: io::Write>(writer: W, rows: &[MonthlyRecord]) -> FinControlResult<()> {
    write_rows(writer, &MONTHLY_COLUMNS, rows.iter().map(MonthlyExportRow::from))
}

pub fn write_department_csv<W: io::Write>(
    writer: W,
    rows: &[DepartmentRecord],
) -> FinControlResult<()> {
    write_rows(
        writer,
        &DEPARTMENT_COLUMNS,
        rows.iter().map(DepartmentExportRow::from),
    )
}

pub fn monthly_csv_string(rows: &[MonthlyRecord]) -> FinControlResult<String> {
    let mut buf = Vec::new();
    write_monthly_csv(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn department_csv_string(rows: &[DepartmentRecord]) -> FinControlResult<String> {
    let mut buf = Vec::new();
    write_department_csv(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write both tables into `dir` under their default file names.
pub fn write_to_dir(
    dir: &Path,
    monthly: &[MonthlyRecord],
    department: &[DepartmentRecord],
) -> FinControlResult<(PathBuf, PathBuf)> {
    let monthly_path = dir.join(MONTHLY_FILE_NAME);
    let department_path = dir.join(DEPARTMENT_FILE_NAME);

    write_monthly_csv(File::create(&monthly_path)?, monthly)?;
    write_department_csv(File::create(&department_path)?, department)?;

    debug!(
        monthly = %monthly_path.display(),
        department = %department_path.display(),
        rows = monthly.len() + department.len(),
        "exported dashboard tables"
    );
    Ok((monthly_path, department_path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MonthlyInputs;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample() -> MonthlyRecord {
        MonthlyRecord::from_inputs(&MonthlyInputs {
            date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            revenue: 1_234_567.891,
            expenses: 800_000.125,
            budget_revenue: 1_300_000.0,
            budget_expenses: 790_000.0,
            operating_cash_flow: 400_000.0,
            investing_cash_flow: -150_000.0,
            financing_cash_flow: 25_000.0,
            current_assets: 500_000.0,
            current_liabilities: 250_000.0,
        })
    }

    #[test]
    fn test_to_cents_rounding() {
        assert_eq!(to_cents(1_234_567.891), dec!(1234567.89));
        assert_eq!(to_cents(-150_000.0), dec!(-150000));
        assert_eq!(to_cents(f64::NAN), Decimal::ZERO);
        assert_eq!(to_rate(0.351_23), dec!(0.3512));
    }

    #[test]
    fn test_monthly_header_matches_columns() {
        let csv = monthly_csv_string(&[sample()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), MONTHLY_COLUMNS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("2026-09-30,1234567.89,"), "row={row}");
        assert!(row.ends_with(",September 2026"), "row={row}");
        assert_eq!(row.split(',').count(), MONTHLY_COLUMNS.len());
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let csv = department_csv_string(&[]).unwrap();
        assert_eq!(csv.trim_end(), DEPARTMENT_COLUMNS.join(","));
    }

    #[test]
    fn test_department_row_uses_display_name() {
        let d = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        let rows = vec![DepartmentRecord::new(
            d,
            Department::ResearchAndDevelopment,
            100.0,
            40.0,
            105.0,
            39.0,
        )];
        let csv = department_csv_string(&rows).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "2026-09-30,R&D,100,40,60,105,39,66,September 2026");
    }

    /// Header the csv serializer derives from the struct field order.
    fn derived_header<T: Serialize>(row: T) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(row).unwrap();
        let bytes = wtr.into_inner().unwrap();
        String::from_utf8(bytes).unwrap().lines().next().unwrap().to_string()
    }

    #[test]
    fn test_serialized_fields_follow_column_order() {
        assert_eq!(
            derived_header(MonthlyExportRow::from(&sample())),
            MONTHLY_COLUMNS.join(",")
        );
        let dept = DepartmentRecord::new(
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            Department::Sales,
            1.0,
            1.0,
            1.0,
            1.0,
        );
        assert_eq!(
            derived_header(DepartmentExportRow::from(&dept)),
            DEPARTMENT_COLUMNS.join(",")
        );
    }

    #[test]
    fn test_derived_columns_sum_rounded_inputs() {
        let row = MonthlyExportRow::from(&sample());
        // 1_234_567.891 -> 1234567.89, 800_000.125 -> 800000.13
        assert_eq!(row.revenue, dec!(1234567.89));
        assert_eq!(row.expenses, dec!(800000.13));
        assert_eq!(row.profit, dec!(434567.76));
        assert_eq!(row.profit, row.revenue - row.expenses);
        assert_eq!(row.budget_profit, row.budget_revenue - row.budget_expenses);
        assert_eq!(
            row.net_cash_flow,
            row.operating_cash_flow + row.investing_cash_flow + row.financing_cash_flow
        );

        let dept = DepartmentExportRow::from(&DepartmentRecord::new(
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
            Department::Operations,
            10.005,
            4.004,
            10.015,
            4.994,
        ));
        assert_eq!(dept.profit, dept.revenue - dept.expenses);
        assert_eq!(dept.budget_profit, dept.budget_revenue - dept.budget_expenses);
    }
}
