pub mod consolidate;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;

pub use error::{Result, ToolError};
