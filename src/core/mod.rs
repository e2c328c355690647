//! Core index calculation

pub mod calculator;
pub mod composition;
pub mod config;
pub mod error;
pub mod export;
pub mod log;
pub mod model;
pub mod price;
pub mod schedule;
pub mod series;

// Re-export main types for cleaner imports
pub use calculator::{CalculationRun, DayKind, IndexCalculator};
pub use composition::Composition;
pub use error::{IndexError, PriceTableError};
pub use export::Exporter;
pub use model::IndexModel;
pub use price::{PriceStore, PriceTable};
pub use series::{IndexPoint, IndexSeries};
