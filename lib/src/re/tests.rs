use std::ops::Range;

use pretty_assertions::assert_eq;

use crate::re::codepoints::CodepointString;
use crate::re::matcher::try_match;
use crate::re::operation::Operation;
use crate::re::program::CompiledProgram;
use crate::re::state::MatchState;
use crate::re::Flags;
use crate::Regex;

macro_rules! assert_match {
    ($re:expr, $subject:expr, $expected:expr) => {{
        assert_match!($re, "", $subject, $expected)
    }};
    ($re:expr, $flags:expr, $subject:expr, $expected:expr) => {{
        let re = Regex::with_flags($re, $flags).unwrap();
        let subject = CodepointString::from($subject);
        let expected: Option<Range<usize>> = $expected;
        assert_eq!(
            re.find(&subject).map(|m| m.range()),
            expected,
            "regexp: {}",
            $re
        );
    }};
}

macro_rules! assert_groups {
    ($re:expr, $subject:expr, $groups:expr) => {{
        let re = Regex::new($re).unwrap();
        let subject = CodepointString::from($subject);
        let m = re.find(&subject).unwrap();
        let groups: Vec<Option<Range<usize>>> =
            (0..m.group_count()).map(|n| m.group(n)).collect();
        assert_eq!(groups, $groups, "regexp: {}", $re);
    }};
}

fn find(op: Operation, subject: &str) -> Option<Range<usize>> {
    let program = CompiledProgram::new(op, Flags::none());
    try_match(&program, &CodepointString::from(subject), 0).map(|m| m.range())
}

#[test]
fn sequence_with_repeat() {
    let op = Operation::sequence(vec![
        Operation::atom("a"),
        Operation::star(Operation::atom("b")),
        Operation::atom("c"),
    ]);
    let subject = CodepointString::from("abbbc");

    // Without optimizations.
    let mut state = MatchState::new(&subject, Flags::none(), 1);
    let ends = op.iterate_matches(&mut state, 0).collect_all(&mut state);
    assert_eq!(ends, vec![5]);

    // With optimizations.
    let program = CompiledProgram::new(op, Flags::none());
    match program.root() {
        Operation::Sequence(ops) => {
            assert!(matches!(ops[1], Operation::UnambiguousRepeat(_)))
        }
        op => panic!("unexpected root: {:?}", op),
    }
    let m = try_match(&program, &subject, 0).unwrap();
    assert_eq!(m.range(), 0..5);
}

#[test]
fn backreferences() {
    let op = Operation::sequence(vec![
        Operation::capture(1, Operation::plus(Operation::atom("a"))),
        Operation::backreference(1),
    ]);
    let program = CompiledProgram::new(op, Flags::none());
    let subject = CodepointString::from("aaaa");
    let m = try_match(&program, &subject, 0).unwrap();

    assert_eq!(m.range(), 0..4);
    assert_eq!(m.group(1), Some(0..2));

    // Group 1 never matches, so the backreference can't match either.
    let op = Operation::sequence(vec![
        Operation::optional(Operation::capture(1, Operation::atom("x"))),
        Operation::backreference(1),
        Operation::atom("a"),
    ]);
    assert_eq!(find(op, "a"), None);

    // Group 1 matches the empty string, and so does the backreference.
    let op = Operation::sequence(vec![
        Operation::capture(1, Operation::star(Operation::atom("x"))),
        Operation::backreference(1),
        Operation::atom("a"),
    ]);
    assert_eq!(find(op, "a"), Some(0..1));
}

#[test]
fn case_blind_backreference() {
    let op = Operation::sequence(vec![
        Operation::capture(1, Operation::atom("ab")),
        Operation::backreference(1),
    ]);
    let mut flags = Flags::none();
    flags.set(crate::re::Flag::CaseIndependent);
    let program = CompiledProgram::new(op, flags);

    let m = try_match(&program, &CodepointString::from("xAbaB"), 0);
    assert_eq!(m.map(|m| m.range()), Some(1..5));
}

#[test]
fn anchors() {
    assert_match!("a$", "a\n", None);
    assert_match!("a$", "m", "a\n", Some(0..1));
    assert_match!("^b", "a\nb", None);
    assert_match!("^b", "m", "a\nb", Some(2..3));
    assert_match!("^$", "", Some(0..0));
    assert_match!("^$", "m", "a\n\nb", Some(2..2));
    assert_match!("(?:x|^)$", "m", "a\n", None);
    assert_match!("(?:x|^)$", "m", "a\n\nb", Some(2..2));
    assert_match!("(?:x|^)$", "m", "a\nx", Some(2..3));
}

#[test]
fn begin_line_after_trailing_newline() {
    let mut flags = Flags::none();
    flags.set(crate::re::Flag::MultiLine);

    let begin_line = |subject: &str, pos: usize| {
        let subject = CodepointString::from(subject);
        let mut state = MatchState::new(&subject, flags, 1);
        Operation::BeginLine
            .iterate_matches(&mut state, pos)
            .collect_all(&mut state)
    };

    assert_eq!(begin_line("a\n", 0), vec![0]);
    assert_eq!(begin_line("a\n", 1), vec![]);
    assert_eq!(begin_line("a\n", 2), vec![]);
    assert_eq!(begin_line("a\nb", 2), vec![2]);
    assert_eq!(begin_line("", 0), vec![0]);
}

#[test]
fn quantifiers() {
    assert_match!("a*?b", "aab", Some(0..3));
    assert_match!("x*", "", Some(0..0));
    assert_match!("[^a]+", "aabbc", Some(2..5));
    assert_match!("(?:ab)+?c", "ababc", Some(0..5));
    assert_match!("a{2,3}", "aaaa", Some(0..3));
    assert_match!("a{2,3}?", "aaaa", Some(0..2));
    assert_match!("a{2}", "abaa", Some(2..4));
    assert_match!("(a|b)*?c", "abac", Some(0..4));
    assert_match!("(?:a|ab)*c", "ababc", Some(0..5));
    assert_match!("(?:a|ab)*?b", "aab", Some(0..3));
}

#[test]
fn nullable_repeats() {
    assert_match!("(a*)*b", "aab", Some(0..3));
    assert_match!("(?:x*)*y", "aay", Some(2..3));
    assert_match!("(?:x*)*?y", "aay", Some(2..3));
    assert_match!("(a?)+$", "aaa", Some(0..3));
    assert_match!("(?:a*|b)*c", "abbac", Some(0..5));
}

#[test]
fn flags() {
    assert_match!("ABC", "i", "xabc", Some(1..4));
    assert_match!("a.c", "abc\na\nc", Some(0..3));
    assert_match!("a.c", "a\nc", None);
    assert_match!("a.c", "s", "a\nc", Some(0..3));
    assert_match!("a.c", "q", "abca.c", Some(3..6));
    assert_match!("a b", "x", "xab", Some(1..3));
    assert_match!("k", "iq", "xK", Some(1..2));
    assert_match!("k", "iq", "x\u{212A}", Some(1..2));
    assert_match!("\u{212A}", "iq", "xk", Some(1..2));
    assert_match!("\u{212A}", "iq", "xK", Some(1..2));
}

#[test]
fn codepoints() {
    assert_match!("é+", "caféé", Some(3..5));
    assert_match!("😀.", "a😀b", Some(1..3));
    assert_match!("[😀-😂]", "x😁", Some(1..2));
}

#[test]
fn groups() {
    assert_groups!(
        "(a|ab)(c|bcd)(d*)",
        "abcd",
        vec![Some(0..4), Some(0..1), Some(1..4), Some(4..4)]
    );
    assert_groups!("(a)|(b)", "b", vec![Some(0..1), None, Some(0..1)]);
    assert_groups!("(ab)*", "ababx", vec![Some(0..4), Some(2..4)]);
    assert_groups!("(a*)+", "b", vec![Some(0..0), Some(0..0)]);
    assert_groups!(
        "(a*)b|(a*)c",
        "aac",
        vec![Some(0..3), None, Some(0..2)]
    );
}

#[test]
fn huge_repetitions() {
    let re = Regex::new("(?:(?:(?:a{4294967295}){4294967295}){4294967295})")
        .unwrap();
    assert_eq!(re.program().min_length(), usize::MAX);
    assert_eq!(re.program().fixed_length(), None);
    assert!(!re.is_match(&CodepointString::from("aaa")));

    let op = Operation::sequence(vec![
        Operation::repeat(Operation::atom("ab"), usize::MAX, None, true),
        Operation::repeat(Operation::atom("c"), 2, Some(2), true),
    ]);
    assert_eq!(op.min_match_length(), usize::MAX);
    assert_eq!(op.match_length(), None);

    let op = Operation::sequence(vec![
        Operation::repeat(
            Operation::atom("ab"),
            usize::MAX,
            Some(usize::MAX),
            true,
        ),
        Operation::atom("c"),
    ]);
    assert_eq!(op.match_length(), None);
}
