#![forbid(unsafe_code)]

pub mod calculator;
pub mod load;
pub mod plot;
pub mod schema;
pub mod search;
pub mod table;

pub use calculator::{SalaryBreakdown, Settings, TaxCalculator};
pub use load::Schedule;
