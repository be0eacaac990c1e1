/*! A read-only string that is randomly indexable by Unicode codepoint.

Rust strings are UTF-8, which means that the n-th character of a string
can't be found without decoding everything before it. The matching engine
constantly jumps back and forth by codepoint index, so subjects are first
converted into a [`CodepointString`], which stores one fixed-width unit per
codepoint.

Three backing representations are used, chosen by the widest codepoint in
the text: one byte per codepoint when every codepoint is below U+0100, two
bytes when every codepoint is in the Basic Multilingual Plane, and four
bytes otherwise. The representation is never observable except through
memory usage.
*/

use std::fmt::{Debug, Display, Formatter, Write};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

#[derive(Clone)]
enum Units {
    Narrow(Arc<[u8]>),
    Bmp(Arc<[u16]>),
    Wide(Arc<[u32]>),
}

impl Units {
    fn from_codepoints(codepoints: Vec<u32>) -> Self {
        match codepoints.iter().copied().max().unwrap_or(0) {
            0..=0xff => Units::Narrow(
                codepoints.into_iter().map(|cp| cp as u8).collect(),
            ),
            0x100..=0xffff => Units::Bmp(
                codepoints.into_iter().map(|cp| cp as u16).collect(),
            ),
            _ => Units::Wide(codepoints.into()),
        }
    }

    #[inline]
    fn get(&self, i: usize) -> u32 {
        match self {
            Units::Narrow(units) => units[i] as u32,
            Units::Bmp(units) => units[i] as u32,
            Units::Wide(units) => units[i],
        }
    }
}

/// An immutable sequence of Unicode codepoints with O(1) random access.
///
/// Cloning a `CodepointString` and taking substrings of it are cheap
/// operations, the underlying buffer is shared.
#[derive(Clone)]
pub struct CodepointString {
    units: Units,
    offset: usize,
    len: usize,
}

impl CodepointString {
    /// Creates a [`CodepointString`] from a sequence of raw codepoints.
    pub fn from_codepoints(codepoints: Vec<u32>) -> Self {
        let len = codepoints.len();
        Self { units: Units::from_codepoints(codepoints), offset: 0, len }
    }

    /// Returns the number of codepoints in the string.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the codepoint at index `i`.
    ///
    /// # Panics
    ///
    /// If `i` is not lower than [`CodepointString::len`].
    #[inline]
    pub fn at(&self, i: usize) -> u32 {
        assert!(i < self.len, "codepoint index {} out of range", i);
        self.units.get(self.offset + i)
    }

    /// Returns the codepoint at index `i`, or `None` if `i` is out of
    /// range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<u32> {
        if i < self.len {
            Some(self.units.get(self.offset + i))
        } else {
            None
        }
    }

    /// Returns `true` if `pos` is at or past the end of the string.
    #[inline]
    pub fn is_at_end(&self, pos: usize) -> bool {
        pos >= self.len
    }

    /// Returns a view of the codepoints in the range `start..end`.
    ///
    /// # Panics
    ///
    /// If `start > end` or `end > self.len()`.
    pub fn substring(&self, start: usize, end: usize) -> Self {
        assert!(
            start <= end && end <= self.len,
            "substring {}..{} out of range for length {}",
            start,
            end,
            self.len
        );
        Self {
            units: self.units.clone(),
            offset: self.offset + start,
            len: end - start,
        }
    }

    /// Returns the index of the first occurrence of `cp` at or after
    /// `from`.
    pub fn index_of(&self, cp: u32, from: usize) -> Option<usize> {
        (from..self.len).find(|i| self.units.get(self.offset + i) == cp)
    }

    /// Returns `true` if the codepoints starting at `pos` are the same
    /// as the ones in `needle`.
    pub fn starts_with_at(
        &self,
        pos: usize,
        needle: &CodepointString,
    ) -> bool {
        pos + needle.len() <= self.len
            && needle
                .iter()
                .enumerate()
                .all(|(i, cp)| self.at(pos + i) == cp)
    }

    /// Returns an iterator over the codepoints in the string.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(|i| self.units.get(self.offset + i))
    }
}

impl From<&str> for CodepointString {
    fn from(s: &str) -> Self {
        Self::from_codepoints(s.chars().map(|c| c as u32).collect())
    }
}

impl From<String> for CodepointString {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl FromIterator<u32> for CodepointString {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self::from_codepoints(iter.into_iter().collect())
    }
}

impl PartialEq for CodepointString {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for CodepointString {}

impl PartialEq<&str> for CodepointString {
    fn eq(&self, other: &&str) -> bool {
        self.iter().eq(other.chars().map(|c| c as u32))
    }
}

impl Hash for CodepointString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for cp in self.iter() {
            state.write_u32(cp);
        }
    }
}

impl Display for CodepointString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for cp in self.iter() {
            f.write_char(
                char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER),
            )?;
        }
        Ok(())
    }
}

impl Debug for CodepointString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

/// Codepoints that fold to the same codepoint as some other one, but that
/// can't be reached from it through simple lowercase and uppercase
/// mappings. Each entry is `(folded, codepoint)`.
const FOLD_EXCEPTIONS: &[(u32, u32)] = &[
    (0x006B, 0x212A), // k, KELVIN SIGN
    (0x0073, 0x017F), // s, LATIN SMALL LETTER LONG S
    (0x00DF, 0x1E9E), // sharp s, LATIN CAPITAL LETTER SHARP S
    (0x00E5, 0x212B), // a with ring above, ANGSTROM SIGN
    (0x03B2, 0x03D0), // beta, GREEK BETA SYMBOL
    (0x03B5, 0x03F5), // epsilon, GREEK LUNATE EPSILON SYMBOL
    (0x03B8, 0x03D1), // theta, GREEK THETA SYMBOL
    (0x03B9, 0x0345), // iota, COMBINING GREEK YPOGEGRAMMENI
    (0x03B9, 0x1FBE), // iota, GREEK PROSGEGRAMMENI
    (0x03BA, 0x03F0), // kappa, GREEK KAPPA SYMBOL
    (0x03BC, 0x00B5), // mu, MICRO SIGN
    (0x03C0, 0x03D6), // pi, GREEK PI SYMBOL
    (0x03C1, 0x03F1), // rho, GREEK RHO SYMBOL
    (0x03C3, 0x03C2), // sigma, GREEK SMALL LETTER FINAL SIGMA
    (0x03C6, 0x03D5), // phi, GREEK PHI SYMBOL
    (0x03C9, 0x2126), // omega, OHM SIGN
];

fn lowercase(cp: u32) -> Option<u32> {
    single_mapping(char::from_u32(cp)?.to_lowercase())
}

fn uppercase(cp: u32) -> Option<u32> {
    single_mapping(char::from_u32(cp)?.to_uppercase())
}

fn single_mapping<I: Iterator<Item = char>>(mut mapping: I) -> Option<u32> {
    match (mapping.next(), mapping.next()) {
        (Some(c), None) => Some(c as u32),
        _ => None,
    }
}

/// Returns the codepoint that represents all the codepoints that are
/// equal to `cp` when case is ignored. That's the lowercase form of the
/// uppercase form of `cp`, using only simple (one to one) mappings.
pub fn simple_fold(cp: u32) -> u32 {
    let upper = uppercase(cp).unwrap_or(cp);
    lowercase(upper).unwrap_or(upper)
}

/// Returns all the codepoints that are equal to `cp` when case is ignored,
/// `cp` itself included.
///
/// Only simple (one to one) case mappings are taken into account.
pub fn case_variants(cp: u32) -> SmallVec<[u32; 4]> {
    let mut variants = SmallVec::new();
    variants.push(cp);

    let folded = simple_fold(cp);

    let candidates = [lowercase(cp), uppercase(cp), Some(folded)]
        .into_iter()
        .chain([uppercase(folded)])
        .flatten()
        .chain(
            FOLD_EXCEPTIONS
                .iter()
                .filter(|(f, _)| *f == folded)
                .map(|(_, c)| *c),
        );

    for variant in candidates {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }

    variants
}

/// Returns `true` if codepoints `a` and `b` are equal when case is ignored.
pub fn equal_case_blind(a: u32, b: u32) -> bool {
    a == b || simple_fold(a) == simple_fold(b)
}
