pub mod matcher;
pub mod reference;

pub use matcher::{MatchRecord, NameMatcher};
pub use reference::{ReferenceMode, ReferenceNames};
