//! catstat - descriptive statistics over categorical observations
//!
//! This library normalizes grouped category labels, flattens them into one
//! multiset, and computes mode, lower median, frequency variance and the
//! probability of a target category. Frequency tables can be published to
//! upsert sinks and rendered as text, JSON or CSV. An election results
//! registry (State -> LGA -> Ward -> PollingUnit) ships alongside.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod dataset;
pub mod election;
pub mod json_output;
pub mod normalize;
pub mod observations;
pub mod persist;
pub mod sink;
pub mod stats;
