use std::ops::Range;

use crate::re::codepoints::CodepointString;
use crate::re::matcher::{try_match, MatchResult};
use crate::re::program::CompiledProgram;

/// A piece of the subject produced by [`Analyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A match of the regular expression, with its captured groups.
    Match(MatchResult),
    /// Text between two matches, or before the first one, or after the
    /// last one.
    NonMatch(Range<usize>),
}

impl Segment {
    /// Span of the segment in the subject.
    pub fn range(&self) -> Range<usize> {
        match self {
            Segment::Match(m) => m.range(),
            Segment::NonMatch(range) => range.clone(),
        }
    }
}

/// Splits a subject into alternating matching and non-matching segments
/// that, put together, cover the whole subject.
///
/// After a zero-length match, the search for the next match starts one
/// codepoint later, so zero-length matches never repeat.
pub struct Analyzer<'p> {
    program: &'p CompiledProgram,
    subject: CodepointString,
    /// End of the last segment produced. `None` when there are no more
    /// segments.
    prev_end: Option<usize>,
    /// True if the last match was empty.
    skip: bool,
    /// Match found after a non-matching segment, produced next.
    pending: Option<MatchResult>,
}

impl<'p> Analyzer<'p> {
    pub fn new(
        program: &'p CompiledProgram,
        subject: CodepointString,
    ) -> Self {
        Self {
            program,
            subject,
            prev_end: Some(0),
            skip: false,
            pending: None,
        }
    }

    /// Returns a new analyzer that starts again from the beginning of the
    /// same subject.
    pub fn another(&self) -> Self {
        Self::new(self.program, self.subject.clone())
    }

    /// The subject being analyzed.
    pub fn subject(&self) -> &CodepointString {
        &self.subject
    }

    fn remainder(&mut self, prev_end: usize) -> Option<Segment> {
        self.prev_end = None;
        let len = self.subject.len();
        if prev_end < len {
            Some(Segment::NonMatch(prev_end..len))
        } else {
            None
        }
    }
}

impl<'p> Iterator for Analyzer<'p> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(m) = self.pending.take() {
            self.prev_end = Some(m.end());
            return Some(Segment::Match(m));
        }

        let prev_end = self.prev_end?;
        let search_start = prev_end + usize::from(self.skip);

        if search_start > self.subject.len() {
            return self.remainder(prev_end);
        }

        match try_match(self.program, &self.subject, search_start) {
            Some(m) => {
                self.skip = m.is_empty();
                if m.start() == prev_end {
                    self.prev_end = Some(m.end());
                    Some(Segment::Match(m))
                } else {
                    let non_match = prev_end..m.start();
                    self.pending = Some(m);
                    Some(Segment::NonMatch(non_match))
                }
            }
            None => self.remainder(prev_end),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Analyzer, Segment};
    use crate::re::codepoints::CodepointString;
    use crate::re::operation::Operation;
    use crate::re::program::CompiledProgram;
    use crate::re::Flags;

    fn segments(program: &CompiledProgram, subject: &str) -> Vec<String> {
        Analyzer::new(program, subject.into())
            .map(|segment| match segment {
                Segment::Match(m) => format!("[{}..{}]", m.start(), m.end()),
                Segment::NonMatch(r) => format!("{}..{}", r.start, r.end),
            })
            .collect()
    }

    #[test]
    fn alternating() {
        let program = CompiledProgram::new(
            Operation::plus(Operation::codepoint('a')),
            Flags::none(),
        );

        assert_eq!(
            segments(&program, "xaayaz"),
            vec!["0..1", "[1..3]", "3..4", "[4..5]", "5..6"]
        );
        assert_eq!(segments(&program, "aa"), vec!["[0..2]"]);
        assert_eq!(segments(&program, "bc"), vec!["0..2"]);
        assert_eq!(segments(&program, ""), Vec::<String>::new());
    }

    #[test]
    fn zero_length_matches() {
        let program = CompiledProgram::new(
            Operation::star(Operation::codepoint('a')),
            Flags::none(),
        );

        assert_eq!(
            segments(&program, "ba"),
            vec!["[0..0]", "0..1", "[1..2]", "[2..2]"]
        );
    }

    #[test]
    fn groups() {
        let program = CompiledProgram::new(
            Operation::sequence(vec![
                Operation::capture(1, Operation::codepoint('a')),
                Operation::capture(2, Operation::codepoint('b')),
            ]),
            Flags::none(),
        );
        let subject = CodepointString::from("xab");
        let analyzer = Analyzer::new(&program, subject.clone());
        let fresh = analyzer.another();
        let segments: Vec<Segment> = analyzer.collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::NonMatch(0..1));
        match &segments[1] {
            Segment::Match(m) => {
                assert_eq!(m.group(1), Some(1..2));
                assert_eq!(m.group(2), Some(2..3));
            }
            segment => panic!("unexpected segment: {:?}", segment),
        }
        assert_eq!(fresh.count(), 2);
    }
}
