//! # wave-cli
//!
//! CLI plumbing shared by the `wave` binary: error reporting, logging and options.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod handler;
pub mod opts;
pub mod utils;
