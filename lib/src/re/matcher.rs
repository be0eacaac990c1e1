/*! Searching for matches of a [`CompiledProgram`] in a subject string.

[`try_match`] finds the first match that starts at some position greater
than or equal to a given one. Instead of blindly trying every position,
it uses the hints extracted from the program when it was compiled:

* Programs that start with `^` are tried only at the start of the subject,
  or at the start of each line in multi-line mode.
* Subjects that are shorter than the minimum length of a match are
  rejected right away.
* Programs that start with a literal prefix are tried only where the
  prefix is found.
* Programs that start with a character class are tried only at the
  positions where the class matches.
*/

use std::ops::Range;

use log::*;

use crate::re::codepoints::{equal_case_blind, CodepointString};
use crate::re::program::CompiledProgram;

/// The groups captured by a successful match.
///
/// Positions are codepoint indexes in the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    groups: Vec<Option<Range<usize>>>,
}

impl MatchResult {
    pub(crate) fn new(groups: Vec<Option<Range<usize>>>) -> Self {
        Self { groups }
    }

    /// Start of the whole match.
    #[inline]
    pub fn start(&self) -> usize {
        self.range().start
    }

    /// End of the whole match.
    #[inline]
    pub fn end(&self) -> usize {
        self.range().end
    }

    /// Span of the whole match.
    pub fn range(&self) -> Range<usize> {
        self.groups.first().cloned().flatten().unwrap_or(0..0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Returns the span captured by group `n`, or `None` if the group
    /// didn't participate in the match.
    pub fn group(&self, n: usize) -> Option<Range<usize>> {
        self.groups.get(n).cloned().flatten()
    }

    /// Number of groups seen during the match, group 0 included.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the text captured by group `n`.
    pub fn group_text(
        &self,
        subject: &CodepointString,
        n: usize,
    ) -> Option<CodepointString> {
        self.group(n).map(|range| subject.substring(range.start, range.end))
    }
}

/// Tries to match the program exactly at position `pos`. Returns the
/// preferred match, if any.
pub(crate) fn match_at(
    program: &CompiledProgram,
    subject: &CodepointString,
    pos: usize,
    anchored: bool,
) -> Option<MatchResult> {
    let mut state = program.new_state(subject).anchored(anchored);
    let mut matches = program.iterate_matches(&mut state, pos);
    matches.next_position(&mut state)?;
    Some(state.result())
}

/// Searches for the first match of `program` in `subject` that starts at
/// `start` or later.
pub fn try_match(
    program: &CompiledProgram,
    subject: &CodepointString,
    start: usize,
) -> Option<MatchResult> {
    let len = subject.len();

    if start > len {
        return None;
    }

    if program.begins_with_bol() {
        if !program.flags().is_multiline() {
            trace!("bol search, only at position 0");
            return if start == 0 {
                match_at(program, subject, 0, false)
            } else {
                None
            };
        }
        trace!("bol search, at each line start from {}", start);
        if let Some(m) = match_at(program, subject, start, false) {
            return Some(m);
        }
        let mut pos = start;
        while let Some(nl) = subject.index_of('\n' as u32, pos) {
            pos = nl + 1;
            // `^` doesn't match after a newline at the end of the subject.
            if pos >= len {
                break;
            }
            if let Some(m) = match_at(program, subject, pos, false) {
                return Some(m);
            }
        }
        return None;
    }

    if len - start < program.min_length() {
        trace!("subject too short, min length is {}", program.min_length());
        return None;
    }

    if let Some(prefix) = program.prefix() {
        trace!("prefix search for `{}`", prefix);
        let case_blind = program.flags().is_case_independent();
        let last = len.saturating_sub(prefix.len());
        return (start..=last)
            .filter(|pos| {
                prefix.iter().enumerate().all(|(i, cp)| {
                    let c = subject.at(pos + i);
                    if case_blind {
                        equal_case_blind(c, cp)
                    } else {
                        c == cp
                    }
                })
            })
            .find_map(|pos| match_at(program, subject, pos, false));
    }

    if let Some(class) = program.initial_class() {
        trace!("initial class search for {}", class);
        return (start..len)
            .filter(|pos| class.matches(subject.at(*pos)))
            .find_map(|pos| match_at(program, subject, pos, false));
    }

    trace!("exhaustive search from {}", start);
    (start..=len).find_map(|pos| match_at(program, subject, pos, false))
}

/// Matches `program` against the whole `subject`, from the first
/// codepoint to the last one.
pub fn anchored_match(
    program: &CompiledProgram,
    subject: &CodepointString,
) -> Option<MatchResult> {
    if program.fixed_length().is_some_and(|len| len != subject.len())
        || program.min_length() > subject.len()
    {
        return None;
    }
    match_at(program, subject, 0, true)
}
