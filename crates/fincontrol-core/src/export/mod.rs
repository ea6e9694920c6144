pub mod writer;

pub use writer::{
    department_csv_string, monthly_csv_string, write_department_csv, write_monthly_csv,
    write_to_dir, DEPARTMENT_FILE_NAME, MONTHLY_FILE_NAME,
};
