//! Low-level parsing infrastructure for the Newick reader: byte parser,
//! label escaping and the [ParsingError] type.

pub mod byte_parser;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
