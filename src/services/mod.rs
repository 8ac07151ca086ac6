pub mod study;

pub use study::{Clock, StudyService};
