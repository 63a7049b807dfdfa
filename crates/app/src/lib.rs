pub mod app;
pub mod error;
pub mod report;

pub use app::App;
pub use error::AppError;
pub use report::{BatchReport, FileFailure, ImportOutcome, SourceFile, SourceKind};
