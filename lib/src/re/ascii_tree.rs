/*! Functions that return an ASCII representation of operation trees.*/

use ::ascii_tree::Tree;
use ::ascii_tree::Tree::{Leaf, Node};

use crate::re::operation::Operation;

fn bounds(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("{{{}}}", min),
        Some(max) => format!("{{{},{}}}", min, max),
        None => format!("{{{},}}", min),
    }
}

/// Returns a representation of the operation as an ASCII tree.
pub fn operation_ascii_tree(op: &Operation) -> Tree {
    let children = || op.children().map(operation_ascii_tree).collect();
    match op {
        Operation::Sequence(_) => Node("sequence".to_string(), children()),
        Operation::Choice(_) => Node("choice".to_string(), children()),
        Operation::CharClass(predicate) => {
            Leaf(vec![format!("class {}", predicate)])
        }
        Operation::Atom(literal) => Leaf(vec![format!("atom {:?}", literal)]),
        Operation::Repeat(r) => Node(
            format!(
                "repeat {}{}",
                bounds(r.min, r.max),
                if r.greedy { "" } else { " reluctant" }
            ),
            children(),
        ),
        Operation::GreedyFixed(r) => Node(
            format!("greedy_fixed {} len={}", bounds(r.min, r.max), r.len),
            children(),
        ),
        Operation::ReluctantFixed(r) => Node(
            format!("reluctant_fixed {} len={}", bounds(r.min, r.max), r.len),
            children(),
        ),
        Operation::UnambiguousRepeat(r) => Node(
            format!("unambiguous_repeat {}", bounds(r.min, r.max)),
            children(),
        ),
        Operation::Capture { group, .. } => {
            Node(format!("capture {}", group), children())
        }
        Operation::BackReference(group) => {
            Leaf(vec![format!("backreference {}", group)])
        }
        Operation::BeginLine => Leaf(vec!["begin_line".to_string()]),
        Operation::EndLine => Leaf(vec!["end_line".to_string()]),
        Operation::EndOfMatch => Leaf(vec!["end_of_match".to_string()]),
        Operation::Empty => Leaf(vec!["empty".to_string()]),
    }
}
