pub mod aggregation;
pub mod funders;
pub mod links;
pub mod record;
pub mod resolve;
pub mod study;

pub use aggregation::{AggregateFieldStat, FilterDescriptor, FilterKind};
pub use record::RawSearchResult;
pub use resolve::Resolution;
pub use study::{Organization, StudyDetail, VariableEntry};
