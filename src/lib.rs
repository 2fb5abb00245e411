//! xpr-fixer library - keeps Vivado .xpr project paths in sync with their location
//!
//! This library provides the core functionality for the `xpr-fixer` CLI tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod hooks;
pub mod locator;
pub mod output;
pub mod templates;
pub mod xpr;
