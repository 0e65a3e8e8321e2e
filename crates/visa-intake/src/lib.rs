//! Narrowing engine for immigration intake conversations.
//!
//! The intake workflow whittles a catalog of visa classifications down to a
//! single recommendation by applying hard eligibility rules to the applicant
//! profile and then asking the most discriminating qualifying questions.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
