/*! This module compiles and executes backtracking regular expressions.

A regular expression is represented by a tree of [`operation::Operation`]
nodes. Such a tree is usually produced by [`parser::Parser`] from the
textual form of the regular expression, but it can also be built by hand,
which is the only way of creating trees that contain backreferences.

Given a tree, a [`program::CompiledProgram`] is created. Creating the
program runs an optimization pass over the tree, replacing constructs that
would require backtracking with deterministic equivalents whenever it is
provably safe, and extracts some hints that accelerate the search for
matches (a literal prefix, the class of the first character, the minimum
length of a match, etc).

Matching works by asking the root operation for the lazy sequence of
positions where a match that starts at some position `p` can end. Each
kind of operation has its own iterator, and iterators for composite
operations are built from the iterators of their children, backtracking
over them as needed. The first position produced by the root operation is
the preferred match.

The [`matcher`] module implements the search for matches, and the
[`tokenize`], [`analyze`] and [`replace`] modules build the usual
string-processing functions on top of it.
*/

use bitmask::bitmask;
use regex_syntax::ast::Span;
use thiserror::Error;

pub mod analyze;
pub mod codepoints;
pub mod iter;
pub mod matcher;
pub mod operation;
pub mod parser;
pub mod predicate;
pub mod program;
pub mod replace;
pub mod state;
pub mod tokenize;

#[cfg(feature = "ascii-tree")]
pub mod ascii_tree;

#[cfg(test)]
mod tests;

/// Maximum number of capture groups in a regular expression, including
/// group 0, which corresponds to the whole match.
pub const MAX_GROUPS: usize = 1000;

/// Maximum number of consecutive times that a repeat operation can
/// produce the same position before giving up. This guarantees that
/// nullable operands repeated without bound don't loop forever.
pub const MAX_ZERO_LENGTH_REPEATS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{msg}")]
    Syntax { msg: String, span: Span },

    #[error("unsupported regular expression construct: {0}")]
    Unsupported(String),

    #[error("the regular expression matches the empty string")]
    MatchesEmptyString,

    #[error("invalid replacement string: {0}")]
    InvalidReplacement(String),

    #[error("too many capture groups (max: {})", MAX_GROUPS - 1)]
    TooManyGroups,

    #[error("invalid regular expression flag: `{0}`")]
    InvalidFlag(char),
}

bitmask! {
    /// Flags that control how a regular expression is compiled and matched.
    ///
    /// With `Literal` the whole pattern is taken as a literal string, and
    /// replacement strings are inserted verbatim, without interpreting
    /// `$N` group references.
    #[derive(Debug)]
    pub mask Flags: u8 where
    /// Each of the flags that can be set in [`Flags`].
    flags Flag {
        CaseIndependent      = 0x01,
        MultiLine            = 0x02,
        DotAll               = 0x04,
        Literal              = 0x08,
        IgnoreWhitespace     = 0x10,
    }
}

impl Flags {
    /// Parses a string of single-letter flags, as accepted by XPath
    /// regular expression functions: `s` (dot-all), `m` (multi-line),
    /// `i` (case-independent), `x` (ignore whitespace) and `q` (literal).
    pub fn parse(s: &str) -> Result<Self, Error> {
        let mut flags = Flags::none();
        for c in s.chars() {
            flags.set(match c {
                's' => Flag::DotAll,
                'm' => Flag::MultiLine,
                'i' => Flag::CaseIndependent,
                'x' => Flag::IgnoreWhitespace,
                'q' => Flag::Literal,
                c => return Err(Error::InvalidFlag(c)),
            });
        }
        Ok(flags)
    }

    #[inline]
    pub fn is_case_independent(&self) -> bool {
        self.contains(Flag::CaseIndependent)
    }

    #[inline]
    pub fn is_multiline(&self) -> bool {
        self.contains(Flag::MultiLine)
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        self.contains(Flag::Literal)
    }
}
