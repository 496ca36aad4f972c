//! Descriptive statistics over a loaded trip dataset.
//!
//! [`engine::StatsSession`] owns a filtered dataset and times each of the
//! four statistics operations; [`utility`] holds the order-stable mode and
//! simple aggregates they share.

pub mod engine;
pub mod utility;
