//! Core types shared by every stage of test ordering.

mod error;

pub(crate) use error::ensure_contract;
pub use error::{Error, Result};
