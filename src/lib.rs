//! Core library for the gl-consolidate command line application.
//!
//! The library merges several general-ledger journal exports into one table.
//! IO adapters live under [`gl::consolidator::io`], the row and table types
//! inside [`gl::consolidator::model`], the grouping logic in
//! [`gl::consolidator::consolidate`], and the end-to-end run under
//! [`gl::consolidator::pipeline`].

pub mod gl;

pub use gl::consolidator::{Result, ToolError, consolidate, error, io, model, pipeline};
