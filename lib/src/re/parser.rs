use regex_syntax as re;
use regex_syntax::hir::{Class, Hir, HirKind, Look};

use crate::re::operation::Operation;
use crate::re::predicate::CodepointPredicate;
use crate::re::{Error, Flag, Flags, MAX_GROUPS};

/// A regular expression parser.
///
/// Takes the source code of a regular expression and produces the
/// corresponding tree of [`Operation`]s. The syntax accepted is the one
/// of the `regex-syntax` crate, minus the constructs the engine doesn't
/// implement (word boundaries and the CRLF-aware anchors). Trees with
/// backreferences can't be produced from text; they must be built with
/// [`Operation::backreference`].
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    flags: Flags,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self { flags: Flags::none() }
    }

    /// Sets the flags that control how the regexp is parsed. The same
    /// flags must be used later when creating the program.
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Parses the regexp and returns its tree of operations.
    pub fn parse(&self, src: &str) -> Result<Operation, Error> {
        // With the literal flag the whole source is plain text.
        if self.flags.is_literal() {
            return Ok(Operation::atom(src));
        }

        let mut parser = re::ast::parse::ParserBuilder::new()
            .empty_min_range(true)
            .ignore_whitespace(self.flags.contains(Flag::IgnoreWhitespace))
            .build();

        let ast = parser.parse(src).map_err(|err| Error::Syntax {
            msg: err.kind().to_string(),
            span: *err.span(),
        })?;

        let mut translator = re::hir::translate::TranslatorBuilder::new()
            .case_insensitive(self.flags.is_case_independent())
            .dot_matches_new_line(self.flags.contains(Flag::DotAll))
            .multi_line(self.flags.is_multiline())
            .unicode(true)
            .build();

        let hir = translator.translate(src, &ast).map_err(|err| {
            Error::Syntax { msg: err.kind().to_string(), span: *err.span() }
        })?;

        if hir.properties().explicit_captures_len() >= MAX_GROUPS {
            return Err(Error::TooManyGroups);
        }

        self.translate(&hir)
    }

    fn translate(&self, hir: &Hir) -> Result<Operation, Error> {
        Ok(match hir.kind() {
            HirKind::Empty => Operation::Empty,
            HirKind::Literal(literal) => {
                let text = std::str::from_utf8(&literal.0).map_err(|_| {
                    Error::Unsupported("non UTF-8 literal".to_string())
                })?;
                Operation::atom(text)
            }
            HirKind::Class(Class::Unicode(class)) => {
                Operation::char_class(CodepointPredicate::from_ranges(
                    class
                        .ranges()
                        .iter()
                        .map(|r| (r.start() as u32, r.end() as u32)),
                ))
            }
            HirKind::Class(Class::Bytes(class)) => {
                Operation::char_class(CodepointPredicate::from_ranges(
                    class
                        .ranges()
                        .iter()
                        .map(|r| (r.start() as u32, r.end() as u32)),
                ))
            }
            HirKind::Look(look) => self.translate_look(*look)?,
            HirKind::Repetition(rep) => Operation::repeat(
                self.translate(&rep.sub)?,
                rep.min as usize,
                rep.max.map(|max| max as usize),
                rep.greedy,
            ),
            HirKind::Capture(capture) => Operation::capture(
                capture.index as usize,
                self.translate(&capture.sub)?,
            ),
            HirKind::Concat(hirs) => Operation::sequence(
                hirs.iter()
                    .map(|hir| self.translate(hir))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            HirKind::Alternation(hirs) => Operation::choice(
                hirs.iter()
                    .map(|hir| self.translate(hir))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        })
    }

    fn translate_look(&self, look: Look) -> Result<Operation, Error> {
        // `BeginLine` and `EndLine` only behave like `\A` and `\z` when the
        // program is not multi-line.
        match look {
            Look::Start if !self.flags.is_multiline() => {
                Ok(Operation::BeginLine)
            }
            Look::End if !self.flags.is_multiline() => Ok(Operation::EndLine),
            Look::StartLF => Ok(Operation::BeginLine),
            Look::EndLF => Ok(Operation::EndLine),
            look => Err(Error::Unsupported(format!("{:?}", look))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Parser;
    use crate::re::operation::Operation;
    use crate::re::{Error, Flag, Flags};

    fn parse(src: &str) -> Result<Operation, Error> {
        Parser::new().parse(src)
    }

    fn parse_with(src: &str, flag: Flag) -> Result<Operation, Error> {
        let mut flags = Flags::none();
        flags.set(flag);
        Parser::new().flags(flags).parse(src)
    }

    #[test]
    fn translation() {
        assert_eq!(parse("abc").unwrap().to_string(), "abc");
        assert_eq!(parse("a|bc").unwrap().to_string(), "(?:a|bc)");
        assert_eq!(parse("(a)+?").unwrap().to_string(), "(a)+?");
        assert_eq!(parse("[a-cx]{2,3}").unwrap().to_string(), "[a-cx]{2,3}");
        assert_eq!(parse("^a$").unwrap().to_string(), "^a$");
        assert_eq!(parse("").unwrap().to_string(), "(?:)");
    }

    #[test]
    fn flags() {
        assert_eq!(
            parse_with("a.b", Flag::Literal).unwrap().to_string(),
            r"a\.b"
        );
        assert_eq!(
            parse_with("a b  c", Flag::IgnoreWhitespace)
                .unwrap()
                .to_string(),
            "abc"
        );
        assert_eq!(
            parse_with("^a", Flag::MultiLine).unwrap().to_string(),
            "^a"
        );
        assert_eq!(
            parse_with("a", Flag::CaseIndependent).unwrap().to_string(),
            "[Aa]"
        );
    }

    #[test]
    fn errors() {
        assert!(matches!(parse("a("), Err(Error::Syntax { .. })));
        assert!(matches!(parse(r"\bfoo"), Err(Error::Unsupported(_))));
        assert!(matches!(
            parse_with(r"\Afoo", Flag::MultiLine),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            parse(&"()".repeat(1000)),
            Err(Error::TooManyGroups)
        ));
        assert!(parse(&"()".repeat(999)).is_ok());
    }
}
