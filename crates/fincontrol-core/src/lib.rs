pub mod analytics;
pub mod calendar;
pub mod error;
pub mod format;
pub mod records;
pub mod types;

#[cfg(feature = "synthetic")]
pub mod synthetic;

#[cfg(feature = "synthetic")]
pub mod dashboard;

#[cfg(feature = "export")]
pub mod export;

pub use error::FinControlError;
pub use records::{Dataset, Department, DepartmentRecord, MonthlyRecord};
pub use types::*;

/// Standard result type for all fincontrol operations
pub type FinControlResult<T> = Result<T, FinControlError>;
