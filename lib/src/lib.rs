/*! A backtracking regular expression engine with captured groups,
backreferences, greedy and reluctant quantifiers, and line anchors.

Subjects are [`CodepointString`]s, and every position is an index in the
sequence of Unicode codepoints, never a byte offset. A regular expression
is compiled once into a program that can be shared by any number of
threads, each match attempt uses its own private state.

# Example

```rust
# use rematch::{CodepointString, Regex};
let re = Regex::new(r"(\w+)@(\w+)\.com").unwrap();
let subject = CodepointString::from("write to joe@example.com");

let m = re.find(&subject).unwrap();

assert_eq!(m.range(), 9..24);
assert_eq!(m.group_text(&subject, 1).unwrap().to_string(), "joe");

let replaced = re.replace(&subject, &"$2/$1".into()).unwrap();
assert_eq!(replaced.to_string(), "write to example/joe");
```

The [`re`] module gives access to the pieces the engine is made of, like
the operation tree, which can be built by hand when the textual syntax
falls short (for instance, for using backreferences).
*/

pub use re::analyze::Analyzer;
pub use re::analyze::Segment;
pub use re::codepoints::CodepointString;
pub use re::matcher::MatchResult;
pub use re::tokenize::Tokenizer;
pub use re::Error;
pub use re::Flag;
pub use re::Flags;

pub use regex::Regex;
pub use regex::RegexBuilder;

pub mod re;
mod regex;
