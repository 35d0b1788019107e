//! BBCode conversion: the state machine, its tag tables, options and errors.

pub mod config;
pub mod converter;
pub mod error;
pub mod tags;

pub use self::config::{BbcodeConfig, ConvertOptions, Loader, TrailingTagPolicy};
pub use self::converter::{convert, convert_with, Converter};
pub use self::error::{Error, Result};
