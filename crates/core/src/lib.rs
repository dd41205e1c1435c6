//! Core components for the transcript summary cache.
//!
//! This crate provides:
//! - Block parser that turns free-form generated text into ordered,
//!   timestamped summary points
//! - Bounded recency cache with two interchangeable storage backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod parser;

pub use cache::{CacheRecord, NewRecord, PutOutcome, RecencyCache, SummaryStore};
pub use config::AppConfig;
pub use error::Error;
pub use parser::{SummaryPoint, parse};
