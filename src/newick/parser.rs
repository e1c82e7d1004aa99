//! Parsing of a single Newick string into a [Dendrogram].

use crate::model::{BranchLength, Dendrogram, NodeIndex};
use crate::newick::defs::{DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::ParsingError;
use tracing::debug;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser for binary Newick trees.
///
/// Open internal nodes are kept on an explicit stack, so deeply nested
/// (caterpillar) trees parse without recursion.
///
/// # Example
/// ```
/// use cladecheck::newick::NewickParser;
/// use cladecheck::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((A:1.0,B:1.0):0.5,C:1.5);");
/// let tree = NewickParser::new().parse_str(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    num_leaves: usize,
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NewickParser {
    /// Creates a new [NewickParser] guessing a small tree.
    pub fn new() -> Self {
        NewickParser {
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
        }
    }

    /// Sets the expected number of leaves, used to pre-allocate the tree.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self
    }

    /// Parses a single Newick tree from the given [ByteParser], up to and
    /// including its terminating `;`.
    ///
    /// # Errors
    /// Returns a [ParsingError] if the input is not a binary Newick tree,
    /// e.g. a node with other than two children, a missing `;`, or a
    /// negative branch length.
    pub fn parse_str(&self, parser: &mut ByteParser) -> Result<Dendrogram, ParsingError> {
        let mut tree = Dendrogram::with_capacity(self.num_leaves);
        // Children parsed so far for each currently open '('
        let mut open: Vec<Vec<NodeIndex>> = Vec::new();

        'node: loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b'(') {
                open.push(Vec::with_capacity(2));
                continue;
            }

            let mut completed = self.parse_leaf(parser, &mut tree)?;

            loop {
                let Some(children) = open.last_mut() else {
                    break 'node;
                };
                children.push(completed);

                parser.skip_comment_and_whitespace()?;
                match parser.peek() {
                    Some(b',') if children.len() == 1 => {
                        parser.next_byte();
                        continue 'node;
                    }
                    Some(b')') if children.len() == 2 => {
                        parser.next_byte();
                        let (left, right) = (children[0], children[1]);
                        open.pop();
                        let branch_length = self.parse_branch_length(parser)?;
                        completed = tree.add_internal((left, right), branch_length);
                    }
                    Some(b',') | Some(b')') => {
                        return Err(ParsingError::invalid_newick_string(
                            parser,
                            "Only binary trees are supported (each '(' needs exactly two children)"
                                .to_string(),
                        ));
                    }
                    None => return Err(ParsingError::unexpected_eof(parser)),
                    Some(other) => {
                        return Err(ParsingError::invalid_newick_string(
                            parser,
                            format!("Expected ',' or ')' but found {:?}", char::from(other)),
                        ));
                    }
                }
            }
        }

        // Last completed node is the root
        let root_index = tree.num_nodes() - 1;
        tree.set_root(root_index);

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        debug!(num_leaves = tree.num_leaves(), "parsed newick tree");
        Ok(tree)
    }

    /// Parses leaf `label[:branch_length]` and adds it to the tree.
    fn parse_leaf(&self, parser: &mut ByteParser, tree: &mut Dendrogram) -> Result<NodeIndex, ParsingError> {
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        // '' is an empty name, an unquoted empty label is a syntax error
        let quoted = parser.peek_is(b'\'');
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() && !quoted {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected leaf label but found {:?}", next_char),
            ));
        }

        let branch_length = self.parse_branch_length(parser)?;
        Ok(tree.add_leaf(Some(label), branch_length))
    }

    /// Parses optional branch length `[:number]`, supporting scientific
    /// notation (e.g. `1.5e-10`).
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if a valid branch length was found
    /// - `Ok(None)` if there is no `:`
    /// - [ParsingError] if the value is not a non-negative number
    fn parse_branch_length(&self, parser: &mut ByteParser) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let value_str = parser.consume_number_chars();
        let value: f64 = value_str
            .parse()
            .map_err(|_| ParsingError::invalid_branch_length(parser, format!("{:?}", value_str)))?;

        BranchLength::try_new(value)
            .map(Some)
            .ok_or_else(|| ParsingError::invalid_branch_length(parser, format!("{value} is negative")))
    }
}
