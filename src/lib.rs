// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod config;
pub mod core;

pub mod browser;
pub mod error;
pub mod extract;
pub mod progress;
pub mod record;
pub mod sink;
pub mod tree;
