//! Bear Rally Optimizer — library entry point.
//!
//! Exposes config, tiers, model, damage, fraction, allocator, recommend, plan,
//! parser, diagnostic and report for use by the CLI and tests.

pub mod allocator;
pub mod config;
pub mod damage;
pub mod diagnostic;
pub mod fraction;
pub mod model;
pub mod parser;
pub mod plan;
pub mod recommend;
pub mod report;
pub mod tiers;
pub mod util;
