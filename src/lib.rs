pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod readers;
pub mod utils;
pub mod writers;

pub use data::*;
pub use error::ConvertError;
pub use pipeline::*;

pub type Result<T> = anyhow::Result<T>;
