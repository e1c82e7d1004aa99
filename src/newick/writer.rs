//! Newick serialization of a [Dendrogram].

use crate::model::{BranchLength, Dendrogram, NodeIndex};
use crate::parser::utils::escape_label;
use std::io::{self, Write};

/// Digits after the decimal point written for branch lengths
pub const BRANCH_LENGTH_DECIMALS: usize = 4;

/// Characters per branch length estimate (e.g. ":0.1234")
const BRANCH_LENGTH_CHARS: usize = 7;

/// Writes the given tree in Newick format, followed by a newline.
///
/// # Errors
/// Returns an I/O error if writing fails.
///
/// # Example
/// ```
/// use cladecheck::linkage::{MergeEvent, build_dendrogram};
/// use cladecheck::newick::write_newick;
///
/// let tree = build_dendrogram(&[MergeEvent::new(0, 1, 0.25, 2)], &["a", "b"]).unwrap();
/// let mut out = Vec::new();
/// write_newick(&mut out, &tree).unwrap();
/// assert_eq!(out, b"(a:0.2500,b:0.2500);\n");
/// ```
pub fn write_newick<W: Write>(mut writer: W, tree: &Dendrogram) -> io::Result<()> {
    writer.write_all(to_newick(tree).as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Leaves are written as `name:length`, internal nodes as
/// `(left,right):length`, lengths with four decimals. Leaf names are
/// escaped where necessary; internal node names and analysis annotations
/// are not written. The root's branch length is only written if it has one
/// (trees built from merge events don't).
pub fn to_newick(tree: &Dendrogram) -> String {
    // Steps of the iterative traversal
    enum Step {
        Enter(NodeIndex),
        Comma,
        Close(NodeIndex),
    }

    fn push_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
        if let Some(branch_length) = branch_length {
            newick.push(':');
            newick.push_str(&format!("{:.*}", BRANCH_LENGTH_DECIMALS, *branch_length));
        }
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree));
    if !tree.is_root_set() {
        return newick;
    }

    let mut stack = vec![Step::Enter(tree.root_index())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(index) => {
                let node = &tree[index];
                match node.children() {
                    None => {
                        newick.push_str(&escape_label(node.name().unwrap_or_default()));
                        push_branch_length(&mut newick, node.branch_length());
                    }
                    Some((left, right)) => {
                        newick.push('(');
                        stack.push(Step::Close(index));
                        stack.push(Step::Enter(right));
                        stack.push(Step::Comma);
                        stack.push(Step::Enter(left));
                    }
                }
            }
            Step::Comma => newick.push(','),
            Step::Close(index) => {
                newick.push(')');
                push_branch_length(&mut newick, tree[index].branch_length());
            }
        }
    }
    newick.push(';');

    newick
}

/// Estimates the length of the Newick string of the given tree, to
/// pre-allocate string capacity.
fn estimate_newick_len(tree: &Dendrogram) -> usize {
    // Each internal node: "(,)"
    const INTERNAL_NODE_CHARS: usize = 3;

    let label_chars: usize = tree
        .leaves()
        .map(|leaf| leaf.name().map_or(0, str::len))
        .sum();

    tree.num_internal() * INTERNAL_NODE_CHARS
        + label_chars
        + tree.num_nodes() * BRANCH_LENGTH_CHARS
        + 1
}
