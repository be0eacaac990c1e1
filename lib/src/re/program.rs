use log::*;

use crate::re::codepoints::CodepointString;
use crate::re::iter::MatchIter;
use crate::re::operation::Operation;
use crate::re::predicate::CodepointPredicate;
use crate::re::state::MatchState;
use crate::re::Flags;

/// A regular expression ready to be matched.
///
/// Holds the optimized tree of operations, the flags it was compiled
/// with, and some hints derived from the tree that speed up the search
/// for matches. A `CompiledProgram` is immutable, and can be shared by
/// any number of threads matching at the same time, each of them with
/// its own [`MatchState`].
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    root: Operation,
    flags: Flags,
    /// Literal text every match must start with.
    prefix: Option<CodepointString>,
    /// Predicate that the first codepoint of every match must satisfy.
    initial_class: Option<CodepointPredicate>,
    /// True if every match must start at the beginning of a line.
    begins_with_bol: bool,
    has_backrefs: bool,
    min_length: usize,
    fixed_length: Option<usize>,
    max_groups: usize,
}

impl CompiledProgram {
    /// Creates a program from a tree of operations.
    ///
    /// An [`Operation::EndOfMatch`] is appended to the tree, the tree is
    /// optimized, and the search hints are extracted from the result.
    pub fn new(op: Operation, flags: Flags) -> Self {
        let root = match op {
            Operation::Sequence(mut ops) => {
                ops.push(Operation::EndOfMatch);
                Operation::Sequence(ops)
            }
            op => Operation::Sequence(vec![op, Operation::EndOfMatch]),
        };

        let root = root.optimize(flags);

        let mut prefix = None;
        let mut initial_class = None;
        let mut begins_with_bol = false;

        match leading_operation(&root) {
            Some(Operation::Atom(literal)) if !literal.is_empty() => {
                prefix = Some(literal.clone());
            }
            Some(Operation::CharClass(predicate)) => {
                initial_class = Some(predicate.clone());
            }
            Some(Operation::BeginLine) => {
                begins_with_bol = true;
            }
            _ => {}
        }

        let program = Self {
            min_length: root.min_match_length(),
            fixed_length: root.match_length(),
            has_backrefs: root.contains_backreferences(),
            max_groups: root.max_group() + 1,
            root,
            flags,
            prefix,
            initial_class,
            begins_with_bol,
        };

        debug!(
            "compiled program `{}`: prefix={:?} initial_class={:?} bol={} \
             min_length={} fixed_length={:?} backrefs={} groups={} flags={:?}",
            program.root,
            program.prefix,
            program.initial_class,
            program.begins_with_bol,
            program.min_length,
            program.fixed_length,
            program.has_backrefs,
            program.max_groups,
            program.flags,
        );

        program
    }

    #[inline]
    pub fn root(&self) -> &Operation {
        &self.root
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[inline]
    pub fn prefix(&self) -> Option<&CodepointString> {
        self.prefix.as_ref()
    }

    #[inline]
    pub fn initial_class(&self) -> Option<&CodepointPredicate> {
        self.initial_class.as_ref()
    }

    #[inline]
    pub fn begins_with_bol(&self) -> bool {
        self.begins_with_bol
    }

    #[inline]
    pub fn has_backrefs(&self) -> bool {
        self.has_backrefs
    }

    /// Minimum number of codepoints in a match.
    #[inline]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Number of codepoints in every match, if all matches have the same
    /// length.
    #[inline]
    pub fn fixed_length(&self) -> Option<usize> {
        self.fixed_length
    }

    /// Number of capture groups, including group 0.
    #[inline]
    pub fn max_groups(&self) -> usize {
        self.max_groups
    }

    /// Creates a fresh [`MatchState`] for matching this program against
    /// `subject`.
    pub fn new_state<'s>(
        &self,
        subject: &'s CodepointString,
    ) -> MatchState<'s> {
        MatchState::new(subject, self.flags, self.max_groups)
            .with_backrefs(self.has_backrefs)
    }

    /// Returns the end positions of the matches that start at `pos`, in
    /// order of preference.
    pub fn iterate_matches<'a>(
        &'a self,
        state: &mut MatchState<'_>,
        pos: usize,
    ) -> MatchIter<'a> {
        state.start_match(pos);
        self.root.iterate_matches(state, pos)
    }
}

/// Returns the operation that matches first in every match of `op`.
fn leading_operation(op: &Operation) -> Option<&Operation> {
    match op {
        Operation::Sequence(ops) => leading_operation(ops.first()?),
        Operation::Capture { op, .. } => leading_operation(op),
        Operation::GreedyFixed(r) | Operation::ReluctantFixed(r)
            if r.min > 0 =>
        {
            leading_operation(&r.op)
        }
        Operation::Repeat(r) | Operation::UnambiguousRepeat(r)
            if r.min > 0 =>
        {
            leading_operation(&r.op)
        }
        op => Some(op),
    }
}
