pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod error;
pub mod grading;
pub mod services;
pub mod srs;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, StudyError};
