//! wfhealth core library.
//!
//! This crate validates the artifacts of a plan-driven workflow: plan
//! documents (markdown), issue snapshots (JSONL), and skill documents that
//! must carry workflow contract markers. Validators never fail on malformed
//! content; every defect becomes a `Finding` in a `Report`.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Findings, reports, and the artifact contracts.
//! - `extract`: Plan task blocks and bold-label field extraction.
//! - `graph`: Dependency cycle detection shared by both validators.
//! - `plan`: Plan document validation.
//! - `issues`: Issues snapshot validation.
//! - `skills`: Skill contract marker check.
//! - `fsutil`: Read-only file access, path resolution, latest-file discovery.
//! - `git`: Best-effort current branch lookup.
//! - `runner`: Mode dispatch and exit policy.
//! - `output`: Human/JSON report printers.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod extract;
pub mod fsutil;
pub mod git;
pub mod graph;
pub mod issues;
pub mod models;
pub mod output;
pub mod plan;
pub mod runner;
pub mod skills;
pub mod utils;
