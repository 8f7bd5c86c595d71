//! MindCanvas Application
//!
//! Headless shell that loads a diagram, lays it out and writes it back.

mod cli;

pub use cli::{AppError, Args, Input, Summary, USAGE, run};
