//! Rule-based credit risk scoring for the German Credit dataset.
//!
//! [`scoring`] holds the configurable rule engine and tier classifier;
//! [`pipeline`] wraps it with CSV loading, cleaning, encoding and reporting.

pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;
