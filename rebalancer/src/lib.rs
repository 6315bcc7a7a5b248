//! sleevebook-rebalancer: command-line planner built on sleevebook.
//!
//! Reads the policy, account snapshot and asset universe from TOML files,
//! layers the saved target overrides on top, and prints recommendations
//! for initial funding, rebalancing and growth-sleeve edits. Nothing is
//! executed; every run leaves a JSONL audit trail.

pub mod audit;
pub mod checks;
pub mod commands;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod render;
pub mod store;
