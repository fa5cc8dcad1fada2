//! # menuqr-core
//!
//! Core building blocks shared by every MenuQR crate: data models, the
//! plan pricing/duration tables and pure subscription math, the `Storage`
//! persistence trait, the error taxonomy, the logger, and environment
//! detection.
//!
//! This crate is a leaf — it performs no I/O of its own beyond defining
//! the async trait that storage backends implement.

pub mod env;
pub mod error;
pub mod logger;
pub mod models;
pub mod plans;
pub mod storage;
pub mod utils;

pub use error::{ApiError, ErrorCode, HttpStatus, MenuQrError, Result};
pub use models::*;
