use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::re::analyze::Analyzer;
use crate::re::codepoints::CodepointString;
use crate::re::matcher::{anchored_match, try_match, MatchResult};
use crate::re::operation::Operation;
use crate::re::parser::Parser;
use crate::re::program::CompiledProgram;
use crate::re::replace::{replace, split};
use crate::re::tokenize::Tokenizer;
use crate::re::{Error, Flag, Flags};

/// Builds a [`Regex`] with non-default options.
///
/// ```
/// # use rematch::{CodepointString, RegexBuilder};
/// let re = RegexBuilder::new("^b").multiline(true).build().unwrap();
/// assert!(re.is_match(&CodepointString::from("a\nb")));
/// ```
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    src: String,
    flags: Flags,
}

impl RegexBuilder {
    pub fn new<S: Into<String>>(src: S) -> Self {
        Self { src: src.into(), flags: Flags::none() }
    }

    fn flag(mut self, flag: Flag, yes: bool) -> Self {
        if yes {
            self.flags.set(flag);
        } else {
            self.flags.unset(flag);
        }
        self
    }

    /// Sets all the flags at once, overriding any flag set before.
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Letters match both their uppercase and lowercase forms.
    pub fn case_insensitive(self, yes: bool) -> Self {
        self.flag(Flag::CaseIndependent, yes)
    }

    /// `^` and `$` match at the start and end of each line.
    pub fn multiline(self, yes: bool) -> Self {
        self.flag(Flag::MultiLine, yes)
    }

    /// The dot (.) matches newline characters too.
    pub fn dot_matches_new_line(self, yes: bool) -> Self {
        self.flag(Flag::DotAll, yes)
    }

    /// Whitespaces in the pattern are ignored.
    pub fn ignore_whitespace(self, yes: bool) -> Self {
        self.flag(Flag::IgnoreWhitespace, yes)
    }

    /// The pattern is a literal string, and replacement templates are
    /// inserted verbatim.
    pub fn literal(self, yes: bool) -> Self {
        self.flag(Flag::Literal, yes)
    }

    /// Parses the pattern and compiles it.
    pub fn build(self) -> Result<Regex, Error> {
        let op = Parser::new().flags(self.flags).parse(&self.src)?;
        Ok(Regex {
            src: self.src,
            program: Arc::new(CompiledProgram::new(op, self.flags)),
        })
    }
}

/// A compiled regular expression.
///
/// Cloning a `Regex` is cheap, all clones share the same program. All
/// positions used by the methods of this type are codepoint indexes.
#[derive(Debug, Clone)]
pub struct Regex {
    src: String,
    program: Arc<CompiledProgram>,
}

impl Regex {
    /// Compiles a regular expression with the default flags.
    pub fn new(src: &str) -> Result<Self, Error> {
        RegexBuilder::new(src).build()
    }

    /// Compiles a regular expression with flags given as a string of
    /// letters, like `"im"`. See [`Flags::parse`].
    pub fn with_flags(src: &str, flags: &str) -> Result<Self, Error> {
        RegexBuilder::new(src).flags(Flags::parse(flags)?).build()
    }

    /// Creates a regular expression from a tree of operations built by
    /// hand. This is the only way of using backreferences.
    pub fn from_operation(op: Operation, flags: Flags) -> Self {
        let src = op.to_string();
        Self { src, program: Arc::new(CompiledProgram::new(op, flags)) }
    }

    /// Source code of the regular expression.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.src.as_str()
    }

    #[inline]
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Returns true if the regular expression matches anywhere in
    /// `subject`.
    pub fn is_match(&self, subject: &CodepointString) -> bool {
        self.find(subject).is_some()
    }

    /// Returns the first match in `subject`.
    pub fn find(&self, subject: &CodepointString) -> Option<MatchResult> {
        self.find_at(subject, 0)
    }

    /// Returns the first match in `subject` that starts at `start` or
    /// later.
    pub fn find_at(
        &self,
        subject: &CodepointString,
        start: usize,
    ) -> Option<MatchResult> {
        try_match(&self.program, subject, start)
    }

    /// Returns the match of the regular expression with the whole
    /// `subject`, if any.
    pub fn match_whole(
        &self,
        subject: &CodepointString,
    ) -> Option<MatchResult> {
        anchored_match(&self.program, subject)
    }

    /// Replaces every match with `template`. See [`crate::re::replace`]
    /// for the syntax of templates.
    pub fn replace(
        &self,
        subject: &CodepointString,
        template: &CodepointString,
    ) -> Result<CodepointString, Error> {
        replace(&self.program, subject, template)
    }

    /// Splits `subject` at every match.
    pub fn split(&self, subject: &CodepointString) -> Vec<CodepointString> {
        split(&self.program, subject)
    }

    /// Returns the tokens separated by matches of this regular
    /// expression. Fails if the regular expression matches the empty
    /// string.
    pub fn tokenize(
        &self,
        subject: CodepointString,
    ) -> Result<Tokenizer<'_>, Error> {
        Tokenizer::new(&self.program, subject)
    }

    /// Returns the matching and non-matching segments of `subject`.
    pub fn analyze(&self, subject: CodepointString) -> Analyzer<'_> {
        Analyzer::new(&self.program, subject)
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.src)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Regex, RegexBuilder};
    use crate::re::codepoints::CodepointString;
    use crate::re::operation::Operation;
    use crate::re::{Error, Flags};

    #[test]
    fn find() {
        let re = Regex::new(r"(\d+)-(\d+)").unwrap();
        let subject = CodepointString::from("tel: 555-1234");
        let m = re.find(&subject).unwrap();

        assert_eq!(m.range(), 5..13);
        assert_eq!(
            m.group_text(&subject, 2),
            Some(CodepointString::from("1234"))
        );
        assert!(re.find_at(&subject, 6).is_some());
        assert!(re.find_at(&subject, 10).is_none());
    }

    #[test]
    fn builder() {
        let subject = CodepointString::from("Foo\nbar");

        let re = RegexBuilder::new("^BAR").case_insensitive(true).build();
        assert!(!re.unwrap().is_match(&subject));

        let re = RegexBuilder::new("^BAR")
            .case_insensitive(true)
            .multiline(true)
            .build()
            .unwrap();
        assert!(re.is_match(&subject));

        let re = RegexBuilder::new("o.b").dot_matches_new_line(true).build();
        assert!(re.unwrap().is_match(&subject));

        let re = RegexBuilder::new("o.b").build().unwrap();
        assert!(!re.is_match(&subject));
    }

    #[test]
    fn with_flags() {
        let re = Regex::with_flags("a+", "iq").unwrap();
        assert!(re.is_match(&CodepointString::from("xA+")));
        assert!(!re.is_match(&CodepointString::from("aa")));
        assert_eq!(
            Regex::with_flags("a", "k").unwrap_err(),
            Error::InvalidFlag('k')
        );
    }

    #[test]
    fn whole() {
        let re = Regex::new("a|ab").unwrap();
        let subject = CodepointString::from("ab");
        assert_eq!(re.find(&subject).unwrap().range(), 0..1);
        assert_eq!(re.match_whole(&subject).unwrap().range(), 0..2);
    }

    #[test]
    fn string_functions() {
        let re = Regex::new(r"\s*,\s*").unwrap();
        let subject = CodepointString::from("a , b,c");

        let tokens: Vec<String> = re
            .tokenize(subject.clone())
            .unwrap()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);

        let pieces: Vec<String> =
            re.split(&subject).iter().map(|p| p.to_string()).collect();
        assert_eq!(pieces, vec!["a", "b", "c"]);

        let replaced = re.replace(&subject, &CodepointString::from(";"));
        assert_eq!(replaced.unwrap().to_string(), "a;b;c");

        assert_eq!(re.analyze(subject).count(), 5);
    }

    #[test]
    fn from_operation() {
        let re = Regex::from_operation(
            Operation::sequence(vec![
                Operation::capture(1, Operation::atom("ab")),
                Operation::backreference(1),
            ]),
            Flags::none(),
        );
        assert_eq!(re.as_str(), r"(ab)\1");
        assert_eq!(
            re.find(&CodepointString::from("xabab")).unwrap().range(),
            1..5
        );
    }
}
