use crate::re::codepoints::CodepointString;
use crate::re::matcher::try_match;
use crate::re::program::CompiledProgram;
use crate::re::Error;

/// Splits a subject into the substrings found between successive,
/// non-overlapping matches of a delimiter.
///
/// The substrings are produced lazily. When the delimiter matches at the
/// very start or the very end of the subject, the first or the last
/// substring is empty, and two adjacent delimiters produce an empty
/// substring between them.
///
/// ```
/// # use rematch::re::codepoints::CodepointString;
/// # use rematch::re::operation::Operation;
/// # use rematch::re::program::CompiledProgram;
/// # use rematch::re::tokenize::Tokenizer;
/// # use rematch::re::Flags;
/// let program = CompiledProgram::new(Operation::atom(","), Flags::none());
/// let subject = CodepointString::from("one,,two");
/// let tokens: Vec<String> = Tokenizer::new(&program, subject)
///     .unwrap()
///     .map(|token| token.to_string())
///     .collect();
/// assert_eq!(tokens, vec!["one", "", "two"]);
/// ```
pub struct Tokenizer<'p> {
    program: &'p CompiledProgram,
    subject: CodepointString,
    /// Where the next token starts. `None` once the last token has been
    /// produced.
    cut: Option<usize>,
}

impl<'p> Tokenizer<'p> {
    /// Creates a tokenizer for `subject`.
    ///
    /// Returns [`Error::MatchesEmptyString`] if the delimiter can match
    /// the empty string, as such a delimiter would never advance.
    pub fn new(
        program: &'p CompiledProgram,
        subject: CodepointString,
    ) -> Result<Self, Error> {
        if program.root().matches_empty_string() {
            return Err(Error::MatchesEmptyString);
        }
        Ok(Self { program, subject, cut: Some(0) })
    }

    /// Returns a new tokenizer that starts again from the beginning of
    /// the same subject, regardless of the progress of this one.
    pub fn another(&self) -> Self {
        Self {
            program: self.program,
            subject: self.subject.clone(),
            cut: Some(0),
        }
    }
}

impl<'p> Iterator for Tokenizer<'p> {
    type Item = CodepointString;

    fn next(&mut self) -> Option<Self::Item> {
        let cut = self.cut?;
        match try_match(self.program, &self.subject, cut) {
            Some(m) => {
                self.cut = Some(m.end());
                Some(self.subject.substring(cut, m.start()))
            }
            None => {
                self.cut = None;
                Some(self.subject.substring(cut, self.subject.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Tokenizer;
    use crate::re::codepoints::CodepointString;
    use crate::re::operation::Operation;
    use crate::re::program::CompiledProgram;
    use crate::re::{Error, Flags};

    fn tokens(tokenizer: Tokenizer) -> Vec<String> {
        tokenizer.map(|t| t.to_string()).collect()
    }

    #[test]
    fn delimiters() {
        let program =
            CompiledProgram::new(Operation::atom(","), Flags::none());
        let tokenize =
            |s: &str| tokens(Tokenizer::new(&program, s.into()).unwrap());

        assert_eq!(tokenize("one,,two"), vec!["one", "", "two"]);
        assert_eq!(tokenize(",a,"), vec!["", "a", ""]);
        assert_eq!(tokenize("abc"), vec!["abc"]);
        assert_eq!(tokenize(""), vec![""]);
    }

    #[test]
    fn variable_length_delimiter() {
        let program = CompiledProgram::new(
            Operation::plus(Operation::codepoint(' ')),
            Flags::none(),
        );
        let subject = CodepointString::from("a  b c");
        let tokenizer = Tokenizer::new(&program, subject).unwrap();
        let again = tokenizer.another();

        assert_eq!(tokens(tokenizer), vec!["a", "b", "c"]);
        assert_eq!(tokens(again), vec!["a", "b", "c"]);
    }

    #[test]
    fn another_is_independent() {
        let program =
            CompiledProgram::new(Operation::atom("-"), Flags::none());
        let mut tokenizer =
            Tokenizer::new(&program, CodepointString::from("x-y")).unwrap();

        assert_eq!(tokenizer.next().map(|t| t.to_string()), Some("x".into()));
        assert_eq!(tokens(tokenizer.another()), vec!["x", "y"]);
        assert_eq!(tokens(tokenizer), vec!["y"]);
    }

    #[test]
    fn empty_delimiter() {
        let program = CompiledProgram::new(
            Operation::star(Operation::codepoint('x')),
            Flags::none(),
        );
        assert!(matches!(
            Tokenizer::new(&program, CodepointString::from("abc")),
            Err(Error::MatchesEmptyString)
        ));
    }
}
