pub mod models;
pub mod scan;

pub use models::{NameMatch, ScanSummary};
pub use scan::CreditScanner;
