use rustc_hash::FxHashSet;

use crate::re::codepoints::CodepointString;
use crate::re::matcher::MatchResult;
use crate::re::operation::OperationId;
use crate::re::Flags;

/// Boundaries of a captured group, as codepoint indexes in the subject.
pub(crate) type Span = (usize, usize);

/// Remembers the positions where repeat operations already produced a
/// zero-length match.
///
/// A repeat whose operand can match the empty string could produce the
/// same position over and over again. Each repeat checks this history
/// before offering the zero-occurrences candidate, and only offers it the
/// first time it is invoked at a given position during a match attempt.
#[derive(Debug, Default)]
pub(crate) struct History {
    zero_length_matches: FxHashSet<(OperationId, usize)>,
}

impl History {
    /// Records a zero-length match of operation `id` at `pos`, returning
    /// `true` if it was recorded already.
    pub fn is_duplicate_zero_length_match(
        &mut self,
        id: OperationId,
        pos: usize,
    ) -> bool {
        !self.zero_length_matches.insert((id, pos))
    }
}

/// A copy of the capture tables at some point of a match attempt.
///
/// Backtracking operations take a copy of the captures before trying an
/// alternative and restore it before trying the next one, which discards
/// every capture made by the abandoned alternative, including the captures
/// made beyond the position where the alternative started.
#[derive(Clone, Debug)]
pub(crate) struct Captures {
    groups: Vec<Option<Span>>,
    backrefs: Vec<Option<Span>>,
}

/// Mutable state for a single match attempt.
///
/// A `MatchState` is created for each attempt of matching a program at
/// some position of the subject, and it's passed by mutable reference to
/// every operation involved in the attempt. It's never shared between
/// attempts.
pub struct MatchState<'s> {
    subject: &'s CodepointString,
    flags: Flags,
    anchored: bool,
    has_backrefs: bool,
    group_count: usize,
    captures: Captures,
    history: History,
}

impl<'s> MatchState<'s> {
    /// Creates a new state for matching against `subject`, with room for
    /// `max_groups` capture groups (group 0 included).
    pub fn new(
        subject: &'s CodepointString,
        flags: Flags,
        max_groups: usize,
    ) -> Self {
        let max_groups = max_groups.max(1);
        Self {
            subject,
            flags,
            anchored: false,
            has_backrefs: false,
            group_count: 1,
            captures: Captures {
                groups: vec![None; max_groups],
                backrefs: vec![None; max_groups],
            },
            history: History::default(),
        }
    }

    /// Indicates whether captures must be recorded also in the table used
    /// by backreferences.
    pub fn with_backrefs(mut self, yes: bool) -> Self {
        self.has_backrefs = yes;
        self
    }

    /// When anchored, the match must extend up to the end of the subject.
    pub fn anchored(mut self, yes: bool) -> Self {
        self.anchored = yes;
        self
    }

    #[inline]
    pub fn subject(&self) -> &'s CodepointString {
        self.subject
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    #[inline]
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Number of groups seen so far, including group 0. This number never
    /// decreases during a match attempt, even when the captures that
    /// raised it are discarded while backtracking.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Returns the boundaries recorded for group `n`, if any.
    pub fn group(&self, n: usize) -> Option<(usize, usize)> {
        self.captures.groups.get(n).copied().flatten()
    }

    /// Returns the most recent boundaries recorded for group `n` while
    /// the match was still tentative. This is what backreferences see.
    pub fn backref(&self, n: usize) -> Option<(usize, usize)> {
        self.captures.backrefs.get(n).copied().flatten()
    }

    /// Marks the start of a match attempt at `pos`.
    pub fn start_match(&mut self, pos: usize) {
        self.captures.groups[0] = Some((pos, pos));
    }

    /// Records the end of the whole match.
    pub fn set_match_end(&mut self, pos: usize) {
        let start = self.group(0).map_or(0, |(start, _)| start);
        self.captures.groups[0] = Some((start, pos));
    }

    /// Records the boundaries of group `n`. Groups beyond the capacity of
    /// the state are silently ignored.
    pub fn set_group(&mut self, n: usize, start: usize, end: usize) {
        if n >= self.captures.groups.len() {
            return;
        }
        self.captures.groups[n] = Some((start, end));
        if self.has_backrefs {
            self.captures.backrefs[n] = Some((start, end));
        }
        if n >= self.group_count {
            self.group_count = n + 1;
        }
    }

    pub(crate) fn history(&mut self) -> &mut History {
        &mut self.history
    }

    /// Takes a copy of the current captures. Returns `None` when there's
    /// nothing to save because the program doesn't have capture groups
    /// besides group 0.
    pub(crate) fn save_captures(&self) -> Option<Captures> {
        if self.captures.groups.len() > 1 {
            Some(self.captures.clone())
        } else {
            None
        }
    }

    pub(crate) fn restore_captures(&mut self, saved: &Option<Captures>) {
        if let Some(saved) = saved {
            self.captures.clone_from(saved);
        }
    }

    /// Builds a [`MatchResult`] from the groups recorded so far.
    pub fn result(&self) -> MatchResult {
        MatchResult::new(
            self.captures.groups[..self.group_count]
                .iter()
                .map(|group| group.map(|(start, end)| start..end))
                .collect(),
        )
    }
}
