//! Newick format writer and parser for dendrograms.
//!
//! # Quick API
//! * [`to_newick`] - serializes a [Dendrogram] (branch lengths with four decimals)
//! * [`write_newick`] - writes the serialization to any [`std::io::Write`]
//! * [`parse_str`] - parses a single Newick string into a [Dendrogram]
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= node ';'`
//! * `node ::= leaf | internal_node`
//! * `internal_node ::= '(' node ',' node ')' [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Labels with delimiters are single-quoted, internal quotes doubled

mod defs;
mod parser;
mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{BRANCH_LENGTH_DECIMALS, to_newick, write_newick};

use crate::model::Dendrogram;
use crate::parser::ByteParser;
use crate::parser::ParsingError;

/// Parses a single Newick string to obtain a [Dendrogram].
///
/// Leaves keep their labels as display names (quotes removed, underscores
/// kept), so a tree written by [`to_newick`] reads back with the same
/// names.
///
/// # Example
/// ```
/// use cladecheck::newick::parse_str;
///
/// let tree = parse_str("((0_Apteryx_owenii:0.1,1_Apteryx_haastii:0.1):0.3,2_Casuarius:0.4);")?;
/// assert_eq!(tree.num_leaves(), 3);
/// assert!(tree.is_ultrametric());
/// # Ok::<(), cladecheck::parser::ParsingError>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<Dendrogram, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    let tree = NewickParser::new().parse_str(&mut byte_parser)?;

    byte_parser.skip_comment_and_whitespace()?;
    if !byte_parser.is_eof() {
        return Err(ParsingError::invalid_newick_string(
            &byte_parser,
            "Unexpected content after ';'".to_string(),
        ));
    }

    Ok(tree)
}
