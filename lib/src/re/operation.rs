/*! Operations are the nodes of the tree that represents a regular expression.

Each operation knows how to match itself at a given position of the
subject: [`Operation::iterate_matches`] returns a [`MatchIter`] that
produces, one by one and in order of preference, every position where a
match of the operation that starts at the given position can end.

Operations are immutable once the tree has been optimized with
[`Operation::optimize`], which is done by
[`crate::re::program::CompiledProgram::new`].
*/

use std::fmt::{Display, Formatter, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::re::codepoints::{case_variants, equal_case_blind, CodepointString};
use crate::re::iter::{
    greedy_fixed, unambiguous, CaptureIter, ChoiceIter, ForceProgress,
    GreedyIter, MatchIter, ReluctantFixedIter, ReluctantIter, RepeatIter,
    SequenceIter,
};
use crate::re::predicate::{intersects, normalize, CodepointPredicate};
use crate::re::state::MatchState;
use crate::re::Flags;

/// Identifies an operation within the history of zero-length matches kept
/// by [`MatchState`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationId(u32);

impl OperationId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A repetition of some operation with a variable match length.
#[derive(Debug)]
pub struct Repeat {
    id: OperationId,
    pub op: Box<Operation>,
    pub min: usize,
    /// Maximum number of occurrences, `None` means unbounded.
    pub max: Option<usize>,
    pub greedy: bool,
    captures: bool,
}

impl Repeat {
    pub fn new(
        op: Operation,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Self {
        let captures = op.contains_captures();
        Self {
            id: OperationId::next(),
            op: Box::new(op),
            min,
            max,
            greedy,
            captures,
        }
    }

    #[inline]
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// True if the repeated operation contains capture groups.
    #[inline]
    pub(crate) fn has_captures(&self) -> bool {
        self.captures
    }
}

impl Clone for Repeat {
    fn clone(&self) -> Self {
        Self::new((*self.op).clone(), self.min, self.max, self.greedy)
    }
}

/// A repetition of some operation that always matches exactly `len`
/// codepoints.
#[derive(Debug, Clone)]
pub struct FixedRepeat {
    pub op: Box<Operation>,
    pub min: usize,
    pub max: Option<usize>,
    pub len: usize,
    captures: bool,
}

impl FixedRepeat {
    pub fn new(
        op: Operation,
        min: usize,
        max: Option<usize>,
        len: usize,
    ) -> Self {
        let captures = op.contains_captures();
        Self { op: Box::new(op), min, max, len, captures }
    }

    #[inline]
    pub(crate) fn has_captures(&self) -> bool {
        self.captures
    }
}

/// A node in the tree that represents a regular expression.
#[derive(Debug, Clone)]
pub enum Operation {
    /// A sequence of operations that must match one after the other.
    Sequence(Vec<Operation>),
    /// A list of alternatives, tried in order.
    Choice(Vec<Operation>),
    /// Matches any codepoint that satisfies a predicate.
    CharClass(CodepointPredicate),
    /// Matches a literal string.
    Atom(CodepointString),
    /// Repetition of an operation with variable match length.
    Repeat(Repeat),
    /// Greedy repetition of an operation with fixed match length.
    GreedyFixed(FixedRepeat),
    /// Reluctant repetition of an operation with fixed match length.
    ReluctantFixed(FixedRepeat),
    /// Repetition that can be matched in a single way, without
    /// backtracking.
    UnambiguousRepeat(Repeat),
    /// Records the span matched by `op` as group number `group`.
    Capture { group: usize, op: Box<Operation> },
    /// Matches the text previously captured by some group.
    BackReference(usize),
    /// `^`
    BeginLine,
    /// `$`
    EndLine,
    /// Appended at the end of every program, records the end of the whole
    /// match.
    EndOfMatch,
    /// Matches the empty string anywhere.
    Empty,
}

impl Operation {
    pub fn sequence(ops: Vec<Operation>) -> Self {
        Self::Sequence(ops)
    }

    pub fn choice(branches: Vec<Operation>) -> Self {
        Self::Choice(branches)
    }

    pub fn atom(literal: &str) -> Self {
        Self::Atom(CodepointString::from(literal))
    }

    pub fn char_class(predicate: CodepointPredicate) -> Self {
        Self::CharClass(predicate)
    }

    /// A character class that matches a single codepoint.
    pub fn codepoint(c: char) -> Self {
        Self::CharClass(CodepointPredicate::Codepoint(c as u32))
    }

    pub fn repeat(
        op: Operation,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Self {
        Self::Repeat(Repeat::new(op, min, max, greedy))
    }

    /// Greedy `op*`
    pub fn star(op: Operation) -> Self {
        Self::repeat(op, 0, None, true)
    }

    /// Greedy `op+`
    pub fn plus(op: Operation) -> Self {
        Self::repeat(op, 1, None, true)
    }

    /// Greedy `op?`
    pub fn optional(op: Operation) -> Self {
        Self::repeat(op, 0, Some(1), true)
    }

    pub fn capture(group: usize, op: Operation) -> Self {
        Self::Capture { group, op: Box::new(op) }
    }

    pub fn backreference(group: usize) -> Self {
        Self::BackReference(group)
    }

    /// Returns the number of codepoints matched by this operation if it's
    /// always the same, or `None` if it's variable.
    pub fn match_length(&self) -> Option<usize> {
        match self {
            Self::Sequence(ops) => ops.iter().try_fold(0_usize, |len, op| {
                len.checked_add(op.match_length()?)
            }),
            Self::Choice(branches) => {
                let mut lengths = branches.iter().map(|b| b.match_length());
                let first = lengths.next()??;
                lengths.all(|len| len == Some(first)).then_some(first)
            }
            Self::CharClass(_) => Some(1),
            Self::Atom(literal) => Some(literal.len()),
            Self::Repeat(r) | Self::UnambiguousRepeat(r) => {
                if Some(r.min) == r.max {
                    r.op.match_length()?.checked_mul(r.min)
                } else {
                    None
                }
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                if Some(r.min) == r.max {
                    r.len.checked_mul(r.min)
                } else {
                    None
                }
            }
            Self::Capture { op, .. } => op.match_length(),
            Self::BackReference(_) => None,
            Self::BeginLine
            | Self::EndLine
            | Self::EndOfMatch
            | Self::Empty => Some(0),
        }
    }

    /// Returns the minimum number of codepoints matched by this operation.
    pub fn min_match_length(&self) -> usize {
        match self {
            Self::Sequence(ops) => ops
                .iter()
                .fold(0, |len, op| len.saturating_add(op.min_match_length())),
            Self::Choice(branches) => branches
                .iter()
                .map(|b| b.min_match_length())
                .min()
                .unwrap_or(0),
            Self::CharClass(_) => 1,
            Self::Atom(literal) => literal.len(),
            Self::Repeat(r) | Self::UnambiguousRepeat(r) => {
                r.op.min_match_length().saturating_mul(r.min)
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                r.len.saturating_mul(r.min)
            }
            Self::Capture { op, .. } => op.min_match_length(),
            Self::BackReference(_)
            | Self::BeginLine
            | Self::EndLine
            | Self::EndOfMatch
            | Self::Empty => 0,
        }
    }

    /// Returns `true` if this operation can match the empty string.
    pub fn matches_empty_string(&self) -> bool {
        match self {
            Self::Sequence(ops) => {
                ops.iter().all(|op| op.matches_empty_string())
            }
            Self::Choice(branches) => {
                branches.iter().any(|b| b.matches_empty_string())
            }
            Self::CharClass(_) => false,
            Self::Atom(literal) => literal.is_empty(),
            Self::Repeat(r) | Self::UnambiguousRepeat(r) => {
                r.min == 0 || r.op.matches_empty_string()
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                r.min == 0 || r.op.matches_empty_string()
            }
            Self::Capture { op, .. } => op.matches_empty_string(),
            Self::BackReference(_)
            | Self::BeginLine
            | Self::EndLine
            | Self::EndOfMatch
            | Self::Empty => true,
        }
    }

    /// Returns the operations that are direct children of this one.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Operation> + '_> {
        match self {
            Self::Sequence(ops) | Self::Choice(ops) => Box::new(ops.iter()),
            Self::Repeat(r) | Self::UnambiguousRepeat(r) => {
                Box::new(std::iter::once(r.op.as_ref()))
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                Box::new(std::iter::once(r.op.as_ref()))
            }
            Self::Capture { op, .. } => Box::new(std::iter::once(op.as_ref())),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Returns `true` if this operation or any of its descendants is a
    /// [`Operation::Capture`].
    pub fn contains_captures(&self) -> bool {
        matches!(self, Self::Capture { .. })
            || self.children().any(|op| op.contains_captures())
    }

    /// Returns `true` if this operation or any of its descendants is a
    /// [`Operation::BackReference`].
    pub fn contains_backreferences(&self) -> bool {
        matches!(self, Self::BackReference(_))
            || self.children().any(|op| op.contains_backreferences())
    }

    /// Returns the highest group number captured by this operation or its
    /// descendants, or 0 if there are no capture groups.
    pub fn max_group(&self) -> usize {
        let own = match self {
            Self::Capture { group, .. } => *group,
            _ => 0,
        };
        self.children().map(|op| op.max_group()).fold(own, usize::max)
    }

    /// Transforms the tree rooted at this operation into an equivalent
    /// one that can be matched more efficiently.
    pub fn optimize(self, flags: Flags) -> Operation {
        match self {
            Self::Sequence(ops) => optimize_sequence(ops, flags),
            Self::Choice(branches) => {
                let mut branches: Vec<Operation> =
                    branches.into_iter().map(|b| b.optimize(flags)).collect();
                if branches.len() == 1 {
                    branches.remove(0)
                } else {
                    Self::Choice(branches)
                }
            }
            Self::Repeat(r) => {
                if r.max == Some(0) {
                    return Self::Empty;
                }
                let op = r.op.optimize(flags);
                // (a?)* is equivalent to (a?)+
                let min = if r.min == 0 && op.matches_empty_string() {
                    1
                } else {
                    r.min
                };
                match op.match_length() {
                    Some(len) if len > 0 => {
                        let fixed = FixedRepeat::new(op, min, r.max, len);
                        if r.greedy {
                            Self::GreedyFixed(fixed)
                        } else {
                            Self::ReluctantFixed(fixed)
                        }
                    }
                    _ => Self::Repeat(Repeat {
                        id: r.id,
                        captures: op.contains_captures(),
                        op: Box::new(op),
                        min,
                        max: r.max,
                        greedy: r.greedy,
                    }),
                }
            }
            Self::GreedyFixed(r) => {
                Self::GreedyFixed(FixedRepeat::new(
                    r.op.optimize(flags),
                    r.min,
                    r.max,
                    r.len,
                ))
            }
            Self::ReluctantFixed(r) => {
                Self::ReluctantFixed(FixedRepeat::new(
                    r.op.optimize(flags),
                    r.min,
                    r.max,
                    r.len,
                ))
            }
            Self::UnambiguousRepeat(r) => Self::UnambiguousRepeat(
                Repeat::new(r.op.optimize(flags), r.min, r.max, true),
            ),
            Self::Capture { group, op } => {
                Self::Capture { group, op: Box::new(op.optimize(flags)) }
            }
            op => op,
        }
    }

    /// Returns an iterator that produces every position where a match of
    /// this operation starting at `pos` can end, in order of preference.
    pub fn iterate_matches<'a>(
        &'a self,
        state: &mut MatchState<'_>,
        pos: usize,
    ) -> MatchIter<'a> {
        let subject = state.subject();
        match self {
            Self::Sequence(ops) if ops.is_empty() => MatchIter::singleton(pos),
            Self::Sequence(ops) => {
                MatchIter::Sequence(SequenceIter::new(ops, pos))
            }
            Self::Choice(branches) => {
                MatchIter::Choice(ChoiceIter::new(branches, state, pos))
            }
            Self::CharClass(predicate) => match subject.get(pos) {
                Some(cp) if predicate.matches(cp) => {
                    MatchIter::singleton(pos + 1)
                }
                _ => MatchIter::Empty,
            },
            Self::Atom(literal) => {
                if matches_at(state, pos, literal.iter(), literal.len()) {
                    MatchIter::singleton(pos + literal.len())
                } else {
                    MatchIter::Empty
                }
            }
            Self::Repeat(r) => {
                let base = if r.greedy {
                    RepeatIter::Greedy(GreedyIter::new(r, state, pos))
                } else {
                    RepeatIter::Reluctant(ReluctantIter::new(r, state, pos))
                };
                MatchIter::Repeat(Box::new(ForceProgress::new(base)))
            }
            Self::GreedyFixed(r) => greedy_fixed(r, state, pos),
            Self::ReluctantFixed(r) => {
                MatchIter::ReluctantFixed(ReluctantFixedIter::new(r, pos))
            }
            Self::UnambiguousRepeat(r) => unambiguous(r, state, pos),
            Self::Capture { group, op } => {
                let inner = op.iterate_matches(state, pos);
                MatchIter::Capture(Box::new(CaptureIter::new(
                    *group, pos, inner,
                )))
            }
            Self::BackReference(group) => match state.backref(*group) {
                None => MatchIter::Empty,
                Some((start, end)) if start == end => {
                    MatchIter::singleton(pos)
                }
                Some((start, end)) => {
                    let captured = (start..end).map(|i| subject.at(i));
                    if matches_at(state, pos, captured, end - start) {
                        MatchIter::singleton(pos + end - start)
                    } else {
                        MatchIter::Empty
                    }
                }
            },
            Self::BeginLine => {
                let at_line_start = pos == 0
                    || (state.flags().is_multiline()
                        && !subject.is_at_end(pos)
                        && subject.at(pos - 1) == '\n' as u32);
                if at_line_start {
                    MatchIter::singleton(pos)
                } else {
                    MatchIter::Empty
                }
            }
            Self::EndLine => {
                let at_line_end = subject.is_at_end(pos)
                    || (state.flags().is_multiline()
                        && subject.at(pos) == '\n' as u32);
                if at_line_end {
                    MatchIter::singleton(pos)
                } else {
                    MatchIter::Empty
                }
            }
            Self::EndOfMatch => {
                if state.is_anchored() && !subject.is_at_end(pos) {
                    MatchIter::Empty
                } else {
                    state.set_match_end(pos);
                    MatchIter::singleton(pos)
                }
            }
            Self::Empty => MatchIter::singleton(pos),
        }
    }

    /// If this operation is a repetition of an atom or a character class,
    /// returns the repeated operation, the bounds, and the greediness.
    fn as_leaf_repeat(
        &self,
    ) -> Option<(&Operation, usize, Option<usize>, bool)> {
        let (op, min, max, greedy) = match self {
            Self::Repeat(r) => (r.op.as_ref(), r.min, r.max, r.greedy),
            Self::GreedyFixed(r) => (r.op.as_ref(), r.min, r.max, true),
            Self::ReluctantFixed(r) => (r.op.as_ref(), r.min, r.max, false),
            _ => return None,
        };
        match op {
            Self::Atom(_) | Self::CharClass(_) => Some((op, min, max, greedy)),
            _ => None,
        }
    }

    fn into_unambiguous(self) -> Operation {
        match self {
            Self::Repeat(r) => {
                Self::UnambiguousRepeat(Repeat::new(*r.op, r.min, r.max, true))
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                Self::UnambiguousRepeat(Repeat::new(*r.op, r.min, r.max, true))
            }
            op => op,
        }
    }

    /// Returns the set of codepoints that can appear at the start of a
    /// match of this operation, as sorted ranges. Returns `None` if the set
    /// can't be determined, or if the operation can match the empty
    /// string.
    pub(crate) fn initial_codepoints(
        &self,
        flags: Flags,
    ) -> Option<Vec<(u32, u32)>> {
        if self.matches_empty_string() {
            return None;
        }
        match self {
            Self::Atom(literal) => {
                let first = literal.at(0);
                if flags.is_case_independent() {
                    Some(normalize(
                        case_variants(first)
                            .into_iter()
                            .map(|c| (c, c))
                            .collect(),
                    ))
                } else {
                    Some(vec![(first, first)])
                }
            }
            Self::CharClass(predicate) => predicate.as_ranges(),
            Self::Sequence(ops) => ops.first()?.initial_codepoints(flags),
            Self::Choice(branches) => {
                let mut ranges = Vec::new();
                for branch in branches {
                    ranges.extend(branch.initial_codepoints(flags)?);
                }
                Some(normalize(ranges))
            }
            Self::Capture { op, .. } => op.initial_codepoints(flags),
            Self::Repeat(r) | Self::UnambiguousRepeat(r) => {
                r.op.initial_codepoints(flags)
            }
            Self::GreedyFixed(r) | Self::ReluctantFixed(r) => {
                r.op.initial_codepoints(flags)
            }
            _ => None,
        }
    }
}

/// Returns `true` if the subject contains the codepoints produced by
/// `expected` at position `pos`, honoring the case-independence flag.
fn matches_at(
    state: &MatchState<'_>,
    pos: usize,
    mut expected: impl Iterator<Item = u32>,
    len: usize,
) -> bool {
    let subject = state.subject();
    if pos + len > subject.len() {
        return false;
    }
    if state.flags().is_case_independent() {
        (pos..pos + len).all(|i| {
            expected
                .next()
                .is_some_and(|cp| equal_case_blind(subject.at(i), cp))
        })
    } else {
        (pos..pos + len).all(|i| expected.next() == Some(subject.at(i)))
    }
}

fn optimize_sequence(ops: Vec<Operation>, flags: Flags) -> Operation {
    let mut ops: Vec<Operation> =
        ops.into_iter().map(|op| op.optimize(flags)).collect();

    match ops.len() {
        0 => return Operation::Empty,
        1 => return ops.remove(0),
        _ => {}
    }

    for i in 0..ops.len() {
        let unambiguous = match ops[i].as_leaf_repeat() {
            Some((op, min, max, greedy)) => {
                Some(min) == max
                    || ops.get(i + 1).is_some_and(|next| {
                        no_ambiguity(op, next, flags, !greedy)
                    })
            }
            None => false,
        };
        if unambiguous {
            let op = std::mem::replace(&mut ops[i], Operation::Empty);
            ops[i] = op.into_unambiguous();
        }
    }

    Operation::Sequence(ops)
}

/// Determines whether a repetition of `op0` followed by `op1` can be
/// matched without backtracking. This is the case when the position where
/// the repetition stops is the only one where `op1` could match, as in
/// `a*b`, where the `a*` must consume every `a` before `b` can match.
fn no_ambiguity(
    op0: &Operation,
    op1: &Operation,
    flags: Flags,
    reluctant: bool,
) -> bool {
    match op1 {
        Operation::EndOfMatch => !reluctant,
        Operation::BeginLine => false,
        Operation::EndLine => {
            !reluctant
                && (!flags.is_multiline()
                    || op0
                        .initial_codepoints(flags)
                        .is_some_and(|r| !intersects(&r, &[(0x0a, 0x0a)])))
        }
        _ => match (
            op0.initial_codepoints(flags),
            op1.initial_codepoints(flags),
        ) {
            (Some(first0), Some(first1)) => !intersects(&first0, &first1),
            _ => false,
        },
    }
}

fn write_quantifier(
    f: &mut Formatter<'_>,
    op: &Operation,
    min: usize,
    max: Option<usize>,
    greedy: bool,
) -> std::fmt::Result {
    let needs_group = match op {
        Operation::Sequence(ops) => ops.len() > 1,
        Operation::Atom(literal) => literal.len() > 1,
        _ => false,
    };
    if needs_group {
        write!(f, "(?:{})", op)?;
    } else {
        write!(f, "{}", op)?;
    }
    match (min, max) {
        (0, None) => f.write_char('*')?,
        (1, None) => f.write_char('+')?,
        (0, Some(1)) => f.write_char('?')?,
        (min, None) => write!(f, "{{{},}}", min)?,
        (min, Some(max)) if min == max => write!(f, "{{{}}}", min)?,
        (min, Some(max)) => write!(f, "{{{},{}}}", min, max)?,
    }
    if !greedy {
        f.write_char('?')?;
    }
    Ok(())
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence(ops) => {
                for op in ops {
                    write!(f, "{}", op)?;
                }
                Ok(())
            }
            Self::Choice(branches) => {
                f.write_str("(?:")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_char('|')?;
                    }
                    write!(f, "{}", branch)?;
                }
                f.write_char(')')
            }
            Self::CharClass(predicate) => write!(f, "{}", predicate),
            Self::Atom(literal) => {
                for cp in literal.iter() {
                    match char::from_u32(cp) {
                        Some('\n') => f.write_str("\\n")?,
                        Some('\r') => f.write_str("\\r")?,
                        Some('\t') => f.write_str("\\t")?,
                        Some(c) if "\\.+*?()|[]{}^$".contains(c) => {
                            write!(f, "\\{}", c)?
                        }
                        Some(c) => f.write_char(c)?,
                        None => write!(f, "\\x{{{:x}}}", cp)?,
                    }
                }
                Ok(())
            }
            Self::Repeat(r) => {
                write_quantifier(f, &r.op, r.min, r.max, r.greedy)
            }
            Self::UnambiguousRepeat(r) => {
                write_quantifier(f, &r.op, r.min, r.max, true)
            }
            Self::GreedyFixed(r) => {
                write_quantifier(f, &r.op, r.min, r.max, true)
            }
            Self::ReluctantFixed(r) => {
                write_quantifier(f, &r.op, r.min, r.max, false)
            }
            Self::Capture { op, .. } => write!(f, "({})", op),
            Self::BackReference(group) => write!(f, "\\{}", group),
            Self::BeginLine => f.write_char('^'),
            Self::EndLine => f.write_char('$'),
            Self::EndOfMatch => f.write_str("\\Z"),
            Self::Empty => f.write_str("(?:)"),
        }
    }
}
