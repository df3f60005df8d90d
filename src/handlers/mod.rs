pub mod analysis;

pub use analysis::{summarize, AnalysisError, AnalysisHandler};
