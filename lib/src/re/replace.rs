/*! Splitting and replacing with a [`CompiledProgram`].

Replacement templates may refer to captured groups with `$N`. A literal
`$` or `\` must be escaped with a backslash (`\$` and `\\`). When the
program has no more than 9 groups, only one digit after the `$` is taken
as part of the group number, so `$10` stands for group 1 followed by a
`0`. Otherwise, digits are taken as long as the resulting number doesn't
exceed the number of groups in the program.
*/

use crate::re::codepoints::CodepointString;
use crate::re::matcher::{try_match, MatchResult};
use crate::re::program::CompiledProgram;
use crate::re::Error;

/// Splits `subject` at every match of `program`.
///
/// A zero-length match at the position where the previous piece ends
/// cuts off a single codepoint. The text after the last match is always
/// returned, even when it's empty.
pub fn split(
    program: &CompiledProgram,
    subject: &CodepointString,
) -> Vec<CodepointString> {
    let len = subject.len();
    let mut pieces = Vec::new();
    let mut pos = 0;

    while pos < len {
        let Some(m) = try_match(program, subject, pos) else {
            break;
        };
        if m.end() == pos {
            pieces.push(subject.substring(pos, m.start() + 1));
            pos = m.end() + 1;
        } else {
            pieces.push(subject.substring(pos, m.start()));
            pos = m.end();
        }
    }

    pieces.push(subject.substring(pos.min(len), len));
    pieces
}

/// A parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(Vec<u32>),
    Group(usize),
}

/// Parses a replacement template. `max_group` is the highest group number
/// that `$N` may refer to.
fn parse_template(
    template: &CodepointString,
    max_group: usize,
) -> Result<Vec<Piece>, Error> {
    let mut pieces = Vec::new();
    let mut text = Vec::new();
    let mut chars = template.iter().peekable();

    while let Some(c) = chars.next() {
        match char::from_u32(c) {
            Some('\\') => match chars.next().and_then(char::from_u32) {
                Some(escaped @ ('\\' | '$')) => text.push(escaped as u32),
                Some(other) => {
                    return Err(Error::InvalidReplacement(format!(
                        "invalid escape sequence `\\{}`",
                        other
                    )))
                }
                None => {
                    return Err(Error::InvalidReplacement(
                        "template ends with `\\`".to_string(),
                    ))
                }
            },
            Some('$') => {
                let mut group = match chars.next().and_then(char::from_u32) {
                    Some(d) if d.is_ascii_digit() => digit_value(d),
                    _ => {
                        return Err(Error::InvalidReplacement(
                            "`$` must be followed by a digit".to_string(),
                        ))
                    }
                };
                if max_group > 9 {
                    while let Some(d) =
                        chars.peek().copied().and_then(char::from_u32)
                    {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        let next = group * 10 + digit_value(d);
                        if next > max_group {
                            break;
                        }
                        group = next;
                        chars.next();
                    }
                }
                if !text.is_empty() {
                    pieces.push(Piece::Text(std::mem::take(&mut text)));
                }
                pieces.push(Piece::Group(group));
            }
            _ => text.push(c),
        }
    }

    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }

    Ok(pieces)
}

fn digit_value(d: char) -> usize {
    d as usize - '0' as usize
}

fn expand(
    pieces: &[Piece],
    subject: &CodepointString,
    m: &MatchResult,
    output: &mut Vec<u32>,
) {
    for piece in pieces {
        match piece {
            Piece::Text(text) => output.extend_from_slice(text),
            Piece::Group(n) => {
                if let Some(range) = m.group(*n) {
                    output.extend(
                        subject.substring(range.start, range.end).iter(),
                    );
                }
            }
        }
    }
}

/// Replaces every match of `program` in `subject` with `template`.
///
/// When the program was compiled with [`crate::re::Flag::Literal`] the
/// template is inserted as is, without interpreting `$` or `\`. After a
/// zero-length match, the codepoint that follows it is copied to the
/// output and the search continues right after it.
pub fn replace(
    program: &CompiledProgram,
    subject: &CodepointString,
    template: &CodepointString,
) -> Result<CodepointString, Error> {
    let pieces = if program.flags().is_literal() {
        vec![Piece::Text(template.iter().collect())]
    } else {
        parse_template(template, program.max_groups().saturating_sub(1))?
    };

    let len = subject.len();
    let mut output = Vec::with_capacity(len);
    let mut pos = 0;

    while pos <= len {
        let Some(m) = try_match(program, subject, pos) else {
            break;
        };
        output.extend(subject.substring(pos, m.start()).iter());
        expand(&pieces, subject, &m, &mut output);
        if m.is_empty() {
            if let Some(c) = subject.get(m.start()) {
                output.push(c);
            }
            pos = m.start() + 1;
        } else {
            pos = m.end();
        }
    }

    if pos < len {
        output.extend(subject.substring(pos, len).iter());
    }

    Ok(output.into_iter().collect())
}
