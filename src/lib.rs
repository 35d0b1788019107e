//! # bbcode
//!
//! Converts bracket-tag markup (BBCode) into an HTML fragment in a single pass.
//!
//! Malformed, misplaced or unknown markup is never an error: it is written back out as literal
//! text, with `<`, `>` and `&` escaped, and conversion carries on. See
//! [converter](bbcode::converter) for the state machine and [tags](bbcode::tags) for the tag
//! tables and nesting rules.

pub mod bbcode;

pub use bbcode::{convert, convert_with, ConvertOptions, Converter, Error, TrailingTagPolicy};
