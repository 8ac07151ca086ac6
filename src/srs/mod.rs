pub mod scheduler;

pub use scheduler::{days_to_add, record_review};
