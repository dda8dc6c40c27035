//! bankconv: conversion analysis for bank telemarketing campaigns
//!
//! Loads a campaign table, computes descriptive statistics, trains logistic,
//! random-forest and gradient-boosting classifiers to predict conversion,
//! and renders conversion-rate charts.

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod viz;

pub use error::{PipelineError, PipelineResult};
