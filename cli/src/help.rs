pub const CONFIG_FILE: &str = r#"Config file for rematch

Specifies a config file which controls the behavior of rem. If config file
is not specified, ${HOME}/.rematch.toml is used. If it does not exist the
default options are applied.

Example:

[flags]
case_insensitive = true
multiline = false

[analyze]
show_groups = false"#;

pub const FLAGS_LONG_HELP: &str = r#"Regular expression flags, as letters

The letters are the ones accepted by XPath regular expression functions:

  s   the dot (.) matches newline characters too
  m   ^ and $ match at the start and end of each line
  i   case-insensitive matching
  x   whitespaces in the pattern are ignored
  q   the pattern is a literal string

Example: --flags=im"#;

pub const REPLACEMENT_LONG_HELP: &str = r#"Replacement for each match

$N is replaced with the text captured by group N. A literal $ or \ must be
written as \$ and \\ respectively. With the `q` flag the replacement is
inserted as is."#;

pub const SUBJECT_LONG_HELP: &str = r#"String where the pattern is searched for

If not given, the subject is read from the standard input."#;
