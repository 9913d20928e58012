pub mod scan;

pub use scan::{NameMatch, ScanSummary};
