/*! Lazy iterators over the positions where an operation can finish matching.

Each call to [`crate::re::operation::Operation::iterate_matches`] returns a
[`MatchIter`], a single-use, forward-only sequence of candidate end
positions. Iterators for composite operations hold the iterators of their
children and backtrack over them. All of them are explicit state machines
that receive the [`MatchState`] on every call to
[`MatchIter::next_position`], instead of keeping a reference to it.

Before trying an alternative that could record captures, backtracking
iterators save the capture tables and restore them before trying the next
alternative. That's how captures made by abandoned paths are discarded.
*/

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::re::operation::{FixedRepeat, Operation, Repeat};
use crate::re::state::{Captures, MatchState};
use crate::re::MAX_ZERO_LENGTH_REPEATS;

/// Sequence of candidate end positions for a match of some operation.
pub enum MatchIter<'a> {
    /// Doesn't produce any position.
    Empty,
    /// Produces a single position, if any.
    Singleton(Option<usize>),
    Sequence(SequenceIter<'a>),
    Choice(ChoiceIter<'a>),
    Repeat(Box<ForceProgress<'a>>),
    GreedyFixed(GreedyFixedIter),
    ReluctantFixed(ReluctantFixedIter<'a>),
    Capture(Box<CaptureIter<'a>>),
}

impl<'a> MatchIter<'a> {
    #[inline]
    pub(crate) fn singleton(pos: usize) -> Self {
        Self::Singleton(Some(pos))
    }

    /// Returns the next candidate position, or `None` when there are no
    /// more candidates.
    pub fn next_position(
        &mut self,
        state: &mut MatchState<'_>,
    ) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Singleton(pos) => pos.take(),
            Self::Sequence(it) => it.next_position(state),
            Self::Choice(it) => it.next_position(state),
            Self::Repeat(it) => it.next_position(state),
            Self::GreedyFixed(it) => it.next_position(state),
            Self::ReluctantFixed(it) => it.next_position(state),
            Self::Capture(it) => it.next_position(state),
        }
    }

    /// Consumes the iterator, returning all the remaining candidates.
    pub fn collect_all(mut self, state: &mut MatchState<'_>) -> Vec<usize> {
        let mut positions = Vec::new();
        while let Some(pos) = self.next_position(state) {
            positions.push(pos);
        }
        positions
    }
}

struct Frame<'a> {
    iter: MatchIter<'a>,
    /// Captures at the moment the frame was pushed.
    saved: Option<Captures>,
}

/// Matches a sequence of operations by depth-first backtracking.
///
/// There's one frame in the stack for each operation in the sequence that
/// has been reached so far. Each frame produces the positions where its
/// operation can end, and each of those positions is the starting point
/// for the operation in the next frame. When the stack is full, the
/// position produced by the top frame is a match for the whole sequence.
pub struct SequenceIter<'a> {
    ops: &'a [Operation],
    start: usize,
    frames: Vec<Frame<'a>>,
    primed: bool,
}

impl<'a> SequenceIter<'a> {
    pub(crate) fn new(ops: &'a [Operation], start: usize) -> Self {
        Self {
            ops,
            start,
            frames: Vec::with_capacity(ops.len()),
            primed: false,
        }
    }

    fn push(&mut self, state: &mut MatchState<'_>, pos: usize) {
        let saved = state.save_captures();
        let iter = self.ops[self.frames.len()].iterate_matches(state, pos);
        self.frames.push(Frame { iter, saved });
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        if !self.primed {
            self.primed = true;
            self.push(state, self.start);
        }
        while let Some(top) = self.frames.last_mut() {
            match top.iter.next_position(state) {
                Some(pos) if self.frames.len() == self.ops.len() => {
                    return Some(pos)
                }
                Some(pos) => self.push(state, pos),
                None => {
                    if let Some(frame) = self.frames.pop() {
                        state.restore_captures(&frame.saved);
                    }
                }
            }
        }
        None
    }
}

/// Tries each alternative in order, producing all the positions of the
/// first one, then all the positions of the second one, and so on.
/// Positions produced by more than one alternative are produced once per
/// alternative.
pub struct ChoiceIter<'a> {
    branches: &'a [Operation],
    pos: usize,
    next_branch: usize,
    current: Option<Box<MatchIter<'a>>>,
    saved: Option<Captures>,
}

impl<'a> ChoiceIter<'a> {
    pub(crate) fn new(
        branches: &'a [Operation],
        state: &MatchState<'_>,
        pos: usize,
    ) -> Self {
        Self {
            branches,
            pos,
            next_branch: 0,
            current: None,
            saved: state.save_captures(),
        }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        loop {
            if let Some(current) = self.current.as_mut() {
                if let Some(pos) = current.next_position(state) {
                    return Some(pos);
                }
                self.current = None;
            }
            let branch = self.branches.get(self.next_branch)?;
            if self.next_branch > 0 {
                state.restore_captures(&self.saved);
            }
            self.next_branch += 1;
            self.current =
                Some(Box::new(branch.iterate_matches(state, self.pos)));
        }
    }
}

/// Records the span of each position produced by the inner iterator as
/// the boundaries of a capture group.
pub struct CaptureIter<'a> {
    group: usize,
    start: usize,
    inner: MatchIter<'a>,
}

impl<'a> CaptureIter<'a> {
    pub(crate) fn new(
        group: usize,
        start: usize,
        inner: MatchIter<'a>,
    ) -> Self {
        Self { group, start, inner }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        let pos = self.inner.next_position(state)?;
        state.set_group(self.group, self.start, pos);
        Some(pos)
    }
}

/// Iterator for the repetitions of operations with variable match length.
pub enum RepeatIter<'a> {
    Greedy(GreedyIter<'a>),
    Reluctant(ReluctantIter<'a>),
}

impl<'a> RepeatIter<'a> {
    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        match self {
            Self::Greedy(it) => it.next_position(state),
            Self::Reluctant(it) => it.next_position(state),
        }
    }
}

/// Wraps a [`RepeatIter`] and stops it once it produces the same position
/// more than [`MAX_ZERO_LENGTH_REPEATS`] times in a row.
pub struct ForceProgress<'a> {
    base: RepeatIter<'a>,
    current: Option<usize>,
    repeats: usize,
    done: bool,
}

impl<'a> ForceProgress<'a> {
    pub(crate) fn new(base: RepeatIter<'a>) -> Self {
        Self { base, current: None, repeats: 0, done: false }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        if self.done {
            return None;
        }
        let pos = self.base.next_position(state);
        if pos.is_some() && pos == self.current {
            self.repeats += 1;
            if self.repeats > MAX_ZERO_LENGTH_REPEATS {
                self.done = true;
                return None;
            }
        } else {
            self.current = pos;
            self.repeats = 0;
        }
        pos
    }
}

struct Occurrence<'a> {
    iter: MatchIter<'a>,
    /// Position where this occurrence currently ends.
    pos: usize,
    /// Captures before this occurrence started.
    saved: Option<Captures>,
}

/// Greedy repetition of an operation with variable match length.
///
/// Keeps a stack with one frame per occurrence of the repeated operation.
/// The stack is filled eagerly, as long as the operation keeps matching
/// and the maximum is not reached, and the end of the last occurrence is
/// produced. Then the last frame is asked for an alternative end, and if
/// it finds one the stack is filled again from there; if not, the frame is
/// dropped and the end of the previous occurrence is produced.
///
/// Filling stops at the first empty occurrence. Any number of further
/// occurrences could match the empty string at the same position, so a
/// stack whose top occurrence is empty satisfies the minimum.
pub struct GreedyIter<'a> {
    repeat: &'a Repeat,
    start: usize,
    bound: usize,
    stack: Vec<Occurrence<'a>>,
    /// True when the end of the top frame has not been produced yet.
    fresh: bool,
    /// True if the zero-occurrences candidate must be produced after all
    /// the others.
    zero: bool,
    /// True when the occurrence at the top of the stack is empty.
    empty_top: bool,
}

impl<'a> GreedyIter<'a> {
    pub(crate) fn new(
        repeat: &'a Repeat,
        state: &mut MatchState<'_>,
        start: usize,
    ) -> Self {
        let remaining = state.subject().len().saturating_sub(start) + 1;
        let bound = repeat.max.map_or(remaining, |max| max.min(remaining));
        let zero = repeat.min == 0
            && !state
                .history()
                .is_duplicate_zero_length_match(repeat.id(), start);
        let mut it = Self {
            repeat,
            start,
            bound,
            stack: Vec::new(),
            fresh: true,
            zero,
            empty_top: false,
        };
        it.fill(state, start);
        it
    }

    /// Pushes occurrences starting at `pos` until the operation fails to
    /// match or the maximum number of occurrences is reached.
    fn fill(&mut self, state: &mut MatchState<'_>, mut pos: usize) {
        while self.stack.len() < self.bound {
            let saved = if self.repeat.has_captures() {
                state.save_captures()
            } else {
                None
            };
            let mut iter = self.repeat.op.iterate_matches(state, pos);
            match iter.next_position(state) {
                Some(end) => {
                    self.stack.push(Occurrence { iter, pos: end, saved });
                    if end == pos {
                        self.empty_top = true;
                        break;
                    }
                    pos = end;
                }
                None => {
                    state.restore_captures(&saved);
                    break;
                }
            }
        }
    }

    /// Position where the occurrence at index `i` of the stack started.
    fn occurrence_start(&self, i: usize) -> usize {
        match i.checked_sub(1) {
            Some(prev) => self.stack[prev].pos,
            None => self.start,
        }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        loop {
            if self.fresh {
                self.fresh = false;
                if let Some(top) = self.stack.last() {
                    if self.empty_top || self.stack.len() >= self.repeat.min {
                        return Some(top.pos);
                    }
                }
            }
            let Some(top) = self.stack.last_mut() else {
                if self.zero {
                    self.zero = false;
                    return Some(self.start);
                }
                return None;
            };
            self.empty_top = false;
            match top.iter.next_position(state) {
                Some(end) => {
                    top.pos = end;
                    let last = self.stack.len() - 1;
                    if end == self.occurrence_start(last) {
                        self.empty_top = true;
                    } else {
                        self.fill(state, end);
                    }
                }
                None => {
                    if let Some(occurrence) = self.stack.pop() {
                        state.restore_captures(&occurrence.saved);
                    }
                }
            }
            self.fresh = true;
        }
    }
}

#[derive(Clone)]
struct Node {
    pos: usize,
    saved: Option<Captures>,
}

/// Reluctant repetition of an operation with variable match length.
///
/// The positions reachable with `n` occurrences are computed only after
/// all the positions reachable with `n - 1` occurrences have been
/// produced, so shorter matches are always produced first. A position that
/// was already reached with at least `min` occurrences is not explored
/// again, which guarantees termination even when the repeated operation
/// can match the empty string.
pub struct ReluctantIter<'a> {
    repeat: &'a Repeat,
    start: usize,
    /// Nodes reached with `count` occurrences, pending expansion.
    level: Vec<Node>,
    count: usize,
    /// Nodes ready to be produced.
    ready: VecDeque<Node>,
    seen: FxHashSet<(usize, usize)>,
    zero: bool,
}

impl<'a> ReluctantIter<'a> {
    pub(crate) fn new(
        repeat: &'a Repeat,
        state: &mut MatchState<'_>,
        start: usize,
    ) -> Self {
        let zero = repeat.min == 0
            && !state
                .history()
                .is_duplicate_zero_length_match(repeat.id(), start);
        let mut seen = FxHashSet::default();
        seen.insert((start, 0));
        Self {
            repeat,
            start,
            level: vec![Node { pos: start, saved: state.save_captures() }],
            count: 0,
            ready: VecDeque::new(),
            seen,
            zero,
        }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        if self.zero {
            self.zero = false;
            return Some(self.start);
        }
        loop {
            if let Some(node) = self.ready.pop_front() {
                state.restore_captures(&node.saved);
                return Some(node.pos);
            }
            if self.level.is_empty()
                || self.repeat.max.is_some_and(|max| self.count >= max)
            {
                return None;
            }
            let count = self.count + 1;
            let mut next_level = Vec::new();
            for node in std::mem::take(&mut self.level) {
                state.restore_captures(&node.saved);
                let mut iter = self.repeat.op.iterate_matches(state, node.pos);
                while let Some(pos) = iter.next_position(state) {
                    if self.seen.insert((pos, count.min(self.repeat.min))) {
                        next_level
                            .push(Node { pos, saved: state.save_captures() });
                    }
                }
            }
            if count >= self.repeat.min {
                self.ready.extend(next_level.iter().cloned());
            }
            self.level = next_level;
            self.count = count;
        }
    }
}

/// Greedy repetition of an operation that always matches `len`
/// codepoints.
///
/// All the occurrences are matched upfront, and the candidate positions
/// are computed arithmetically, from the longest to the shortest.
pub struct GreedyFixedIter {
    start: usize,
    len: usize,
    min: usize,
    next: Option<usize>,
    /// Captures after each number of occurrences, when the repeated
    /// operation has capture groups.
    saved: Vec<Option<Captures>>,
}

impl GreedyFixedIter {
    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        let count = self.next?;
        self.next = if count > self.min { Some(count - 1) } else { None };
        if let Some(saved) = self.saved.get(count) {
            state.restore_captures(saved);
        }
        Some(self.start + count * self.len)
    }
}

pub(crate) fn greedy_fixed<'a>(
    repeat: &'a FixedRepeat,
    state: &mut MatchState<'_>,
    start: usize,
) -> MatchIter<'a> {
    let subject_len = state.subject().len();
    let mut saved = Vec::new();
    if repeat.has_captures() {
        saved.push(state.save_captures());
    }
    let mut pos = start;
    let mut count = 0;
    while repeat.max.map_or(true, |max| count < max)
        && pos + repeat.len <= subject_len
    {
        match repeat.op.iterate_matches(state, pos).next_position(state) {
            Some(end) => {
                pos = end;
                count += 1;
                if repeat.has_captures() {
                    saved.push(state.save_captures());
                }
            }
            None => break,
        }
    }
    if count < repeat.min {
        return MatchIter::Empty;
    }
    MatchIter::GreedyFixed(GreedyFixedIter {
        start,
        len: repeat.len,
        min: repeat.min,
        next: Some(count),
        saved,
    })
}

/// Reluctant repetition of an operation that always matches `len`
/// codepoints. Matches the minimum number of occurrences first, and one
/// more occurrence each time it's asked for another candidate.
pub struct ReluctantFixedIter<'a> {
    repeat: &'a FixedRepeat,
    pos: usize,
    count: usize,
    started: bool,
    done: bool,
}

impl<'a> ReluctantFixedIter<'a> {
    pub(crate) fn new(repeat: &'a FixedRepeat, start: usize) -> Self {
        Self { repeat, pos: start, count: 0, started: false, done: false }
    }

    fn occurrence(&mut self, state: &mut MatchState<'_>) -> bool {
        let mut matches = self.repeat.op.iterate_matches(state, self.pos);
        match matches.next_position(state) {
            Some(end) => {
                self.pos = end;
                self.count += 1;
                true
            }
            None => {
                self.done = true;
                false
            }
        }
    }

    fn next_position(&mut self, state: &mut MatchState<'_>) -> Option<usize> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            while self.count < self.repeat.min {
                if !self.occurrence(state) {
                    return None;
                }
            }
            return Some(self.pos);
        }
        if self.repeat.max.is_some_and(|max| self.count >= max) {
            self.done = true;
            return None;
        }
        if self.occurrence(state) {
            Some(self.pos)
        } else {
            None
        }
    }
}

/// Repetition that can only be matched in one way. Consumes as many
/// occurrences as possible and produces a single position.
pub(crate) fn unambiguous<'a>(
    repeat: &'a Repeat,
    state: &mut MatchState<'_>,
    start: usize,
) -> MatchIter<'a> {
    let mut pos = start;
    let mut count = 0;
    while repeat.max.map_or(true, |max| count < max) {
        match repeat.op.iterate_matches(state, pos).next_position(state) {
            Some(end) => {
                count += 1;
                if end == pos && count >= repeat.min {
                    break;
                }
                pos = end;
            }
            None => break,
        }
    }
    if count < repeat.min {
        MatchIter::Empty
    } else {
        MatchIter::singleton(pos)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::re::codepoints::CodepointString;
    use crate::re::operation::Operation;
    use crate::re::state::MatchState;
    use crate::re::Flags;

    fn positions(op: &Operation, subject: &str, pos: usize) -> Vec<usize> {
        let subject = CodepointString::from(subject);
        let mut state =
            MatchState::new(&subject, Flags::none(), op.max_group() + 1);
        op.iterate_matches(&mut state, pos).collect_all(&mut state)
    }

    fn optimized(op: Operation) -> Operation {
        op.optimize(Flags::none())
    }

    #[test]
    fn greedy_descending() {
        let op = Operation::star(Operation::codepoint('a'));
        assert_eq!(positions(&op, "aaab", 0), vec![3, 2, 1, 0]);
        assert_eq!(positions(&optimized(op), "aaab", 0), vec![3, 2, 1, 0]);
    }

    #[test]
    fn reluctant_ascending() {
        let op = Operation::repeat(Operation::codepoint('a'), 0, None, false);
        assert_eq!(positions(&op, "aaab", 0), vec![0, 1, 2, 3]);
        assert_eq!(positions(&optimized(op), "aaab", 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn bounded_repeats() {
        let op =
            Operation::repeat(Operation::codepoint('a'), 1, Some(2), true);
        assert_eq!(positions(&op, "aaab", 0), vec![2, 1]);
        assert_eq!(positions(&optimized(op), "aaab", 0), vec![2, 1]);

        let op =
            Operation::repeat(Operation::codepoint('a'), 2, Some(3), false);
        assert_eq!(positions(&op, "aaaa", 0), vec![2, 3]);
        assert_eq!(positions(&optimized(op), "aaaa", 0), vec![2, 3]);

        let op = Operation::repeat(Operation::codepoint('a'), 2, None, true);
        assert_eq!(positions(&op, "ab", 0), vec![]);
        assert_eq!(positions(&optimized(op), "ab", 0), vec![]);
    }

    #[test]
    fn variable_length_operand() {
        // (a|ab)* over "abab"
        let op = Operation::star(Operation::choice(vec![
            Operation::atom("a"),
            Operation::atom("ab"),
        ]));
        assert_eq!(positions(&op, "abab", 0), vec![1, 3, 4, 2, 0]);

        let op = Operation::repeat(
            Operation::choice(vec![
                Operation::atom("a"),
                Operation::atom("ab"),
            ]),
            1,
            None,
            false,
        );
        assert_eq!(positions(&op, "abab", 0), vec![1, 2, 3, 4]);
    }

    #[test]
    fn nullable_operand_terminates() {
        let op = Operation::star(Operation::optional(Operation::atom("")));
        let result = positions(&op, "xyz", 1);
        assert!(!result.is_empty());
        assert!(result.iter().all(|pos| *pos == 1));
        assert!(result.len() <= 4);

        let result = positions(&optimized(op), "xyz", 1);
        assert!(!result.is_empty());
        assert!(result.iter().all(|pos| *pos == 1));
        assert!(result.len() <= 4);
    }

    #[test]
    fn nullable_operand_meets_minimum() {
        // (a?){3} and (a?){3}? over "" and "a"
        let op = |greedy| {
            optimized(Operation::repeat(
                Operation::optional(Operation::atom("a")),
                3,
                Some(3),
                greedy,
            ))
        };
        assert_eq!(positions(&op(true), "", 0), vec![0]);
        assert_eq!(positions(&op(true), "a", 0), vec![1, 0]);
        assert_eq!(positions(&op(false), "", 0), vec![0]);
        assert_eq!(positions(&op(false), "a", 0), vec![1, 0]);

        let op = Operation::repeat(
            Operation::optional(Operation::atom("a")),
            3,
            None,
            true,
        );
        assert_eq!(positions(&op, "aaaaa", 0)[0], 5);
        assert_eq!(positions(&op, "a", 0), vec![1, 0]);
    }

    #[test]
    fn nullable_reluctant_terminates() {
        let op = Operation::repeat(
            Operation::choice(vec![Operation::atom("a"), Operation::Empty]),
            0,
            None,
            false,
        );
        assert_eq!(positions(&op, "aab", 0), vec![0, 1, 2]);
    }

    #[test]
    fn unambiguous() {
        let op = optimized(Operation::sequence(vec![
            Operation::star(Operation::codepoint('b')),
            Operation::atom("c"),
        ]));
        assert_eq!(positions(&op, "bbbc", 0), vec![4]);
        assert_eq!(positions(&op, "bbbd", 0), vec![]);
        assert_eq!(positions(&op, "c", 0), vec![1]);
    }

    #[test]
    fn sequence_backtracks() {
        // a*ab over "aaab"
        let op = Operation::sequence(vec![
            Operation::star(Operation::codepoint('a')),
            Operation::atom("ab"),
        ]);
        assert_eq!(positions(&op, "aaab", 0), vec![4]);
        assert_eq!(positions(&optimized(op), "aaab", 0), vec![4]);
    }

    #[test]
    fn captures_are_restored() {
        // (a|ab)(c|bcd) over "abcd", the first alternative of the second
        // group fails, and the capture of group 2 must not leak.
        let op = Operation::sequence(vec![
            Operation::capture(
                1,
                Operation::choice(vec![
                    Operation::atom("a"),
                    Operation::atom("ab"),
                ]),
            ),
            Operation::capture(
                2,
                Operation::choice(vec![
                    Operation::atom("c"),
                    Operation::atom("bcd"),
                ]),
            ),
            Operation::EndOfMatch,
        ]);
        let subject = CodepointString::from("abcd");
        let mut state = MatchState::new(&subject, Flags::none(), 3);
        state.start_match(0);
        let mut it = op.iterate_matches(&mut state, 0);

        assert_eq!(it.next_position(&mut state), Some(4));
        assert_eq!(state.group(1), Some((0, 1)));
        assert_eq!(state.group(2), Some((1, 4)));

        assert_eq!(it.next_position(&mut state), Some(3));
        assert_eq!(state.group(1), Some((0, 2)));
        assert_eq!(state.group(2), Some((2, 3)));
    }

    #[test]
    fn greedy_repeat_restores_captures() {
        // (a)* over "aa", the capture must follow the occurrence count.
        let op = Operation::repeat(
            Operation::capture(1, Operation::codepoint('a')),
            0,
            None,
            true,
        );
        for op in [op.clone(), optimized(op)] {
            let subject = CodepointString::from("aa");
            let mut state = MatchState::new(&subject, Flags::none(), 2);
            let mut it = op.iterate_matches(&mut state, 0);

            assert_eq!(it.next_position(&mut state), Some(2));
            assert_eq!(state.group(1), Some((1, 2)));
            assert_eq!(it.next_position(&mut state), Some(1));
            assert_eq!(state.group(1), Some((0, 1)));
            assert_eq!(it.next_position(&mut state), Some(0));
            assert_eq!(state.group(1), None);
        }
    }
}
