use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A test that decides whether a codepoint belongs to a character class.
///
/// Most classes are described by a sorted list of codepoint ranges, which
/// also allows the optimizer to reason about them (for instance, to decide
/// that two consecutive operations can't start with the same codepoint).
/// Classes whose membership is only known to some external table, like
/// Unicode categories, are represented by [`CodepointPredicate::Custom`].
#[derive(Clone)]
pub enum CodepointPredicate {
    /// A single codepoint.
    Codepoint(u32),
    /// A set of inclusive ranges, sorted and non-overlapping.
    Ranges(Vec<(u32, u32)>),
    /// The complement of some other predicate.
    Not(Box<CodepointPredicate>),
    /// An opaque predicate, identified by name for display purposes.
    Custom { name: String, test: Arc<dyn Fn(u32) -> bool + Send + Sync> },
}

impl CodepointPredicate {
    /// Creates a predicate from an arbitrary list of inclusive ranges.
    ///
    /// The ranges are sorted and merged, and a list with a single
    /// one-codepoint range becomes [`CodepointPredicate::Codepoint`].
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let ranges = normalize(ranges.into_iter().collect());
        match ranges.as_slice() {
            [(lo, hi)] if lo == hi => Self::Codepoint(*lo),
            _ => Self::Ranges(ranges),
        }
    }

    /// Creates an opaque predicate.
    pub fn custom<F>(name: &str, test: F) -> Self
    where
        F: Fn(u32) -> bool + Send + Sync + 'static,
    {
        Self::Custom { name: name.to_string(), test: Arc::new(test) }
    }

    /// Returns `true` if `cp` satisfies the predicate.
    pub fn matches(&self, cp: u32) -> bool {
        match self {
            Self::Codepoint(c) => *c == cp,
            Self::Ranges(ranges) => ranges
                .binary_search_by(|(lo, hi)| {
                    if *hi < cp {
                        std::cmp::Ordering::Less
                    } else if *lo > cp {
                        std::cmp::Ordering::Greater
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .is_ok(),
            Self::Not(inner) => !inner.matches(cp),
            Self::Custom { test, .. } => test(cp),
        }
    }

    /// Returns the set of codepoints accepted by this predicate as a list
    /// of sorted, non-overlapping ranges, or `None` if the predicate is
    /// opaque.
    pub fn as_ranges(&self) -> Option<Vec<(u32, u32)>> {
        match self {
            Self::Codepoint(c) => Some(vec![(*c, *c)]),
            Self::Ranges(ranges) => Some(ranges.clone()),
            Self::Not(inner) => Some(complement(&inner.as_ranges()?)),
            Self::Custom { .. } => None,
        }
    }
}

/// Sorts and merges overlapping or adjacent ranges.
pub(crate) fn normalize(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    ranges.sort_unstable();
    let mut result: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (lo, hi) in ranges {
        match result.last_mut() {
            Some((_, last_hi)) if lo <= last_hi.saturating_add(1) => {
                *last_hi = (*last_hi).max(hi);
            }
            _ => result.push((lo, hi)),
        }
    }
    result
}

fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut result = Vec::new();
    let mut next = 0;
    for (lo, hi) in ranges {
        if *lo > next {
            result.push((next, lo - 1));
        }
        next = hi.saturating_add(1);
    }
    if next <= char::MAX as u32 {
        result.push((next, char::MAX as u32));
    }
    result
}

/// Returns `true` if two sorted lists of ranges have some codepoint in
/// common.
pub(crate) fn intersects(a: &[(u32, u32)], b: &[(u32, u32)]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (a_lo, a_hi) = a[i];
        let (b_lo, b_hi) = b[j];
        if a_lo <= b_hi && b_lo <= a_hi {
            return true;
        }
        if a_hi < b_hi {
            i += 1;
        } else {
            j += 1;
        }
    }
    false
}

fn write_codepoint(f: &mut Formatter<'_>, cp: u32) -> std::fmt::Result {
    match char::from_u32(cp) {
        Some(c @ ('\\' | ']' | '[' | '^' | '-')) => write!(f, "\\{}", c),
        Some(c) if !c.is_control() && !c.is_whitespace() => write!(f, "{}", c),
        _ => write!(f, "\\x{{{:x}}}", cp),
    }
}

impl CodepointPredicate {
    /// Writes the members of a class described by codepoints or ranges,
    /// without the enclosing brackets.
    fn write_members(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codepoint(cp) => write_codepoint(f, *cp),
            Self::Ranges(ranges) => {
                for (lo, hi) in ranges {
                    write_codepoint(f, *lo)?;
                    if hi > lo {
                        write!(f, "-")?;
                        write_codepoint(f, *hi)?;
                    }
                }
                Ok(())
            }
            _ => unreachable!(),
        }
    }
}

impl Display for CodepointPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codepoint(_) | Self::Ranges(_) => {
                write!(f, "[")?;
                self.write_members(f)?;
                write!(f, "]")
            }
            Self::Not(inner) => match inner.as_ref() {
                Self::Codepoint(_) | Self::Ranges(_) => {
                    write!(f, "[^")?;
                    inner.write_members(f)?;
                    write!(f, "]")
                }
                Self::Not(inner) => write!(f, "{}", inner),
                Self::Custom { name, .. } => write!(f, "\\P{{{}}}", name),
            },
            Self::Custom { name, .. } => write!(f, "\\p{{{}}}", name),
        }
    }
}

impl Debug for CodepointPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
