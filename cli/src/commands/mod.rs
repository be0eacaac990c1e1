mod analyze;
mod debug;
mod matches;
mod replace;
mod split;
mod tokenize;

pub use analyze::*;
pub use debug::*;
pub use matches::*;
pub use replace::*;
pub use split::*;
pub use tokenize::*;

use std::io::{stdin, Read};
use std::ops::Range;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{arg, command, crate_authors, ArgMatches, Command};
use rematch::{CodepointString, Flag, Flags, Regex, RegexBuilder};

use crate::config::Config;
use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .arg(
            arg!(-i --"case-insensitive" "Case-insensitive matching")
                .global(true),
        )
        .arg(
            arg!(-m --multiline "^ and $ match at the start and end of lines")
                .global(true),
        )
        .arg(
            arg!(-s --"dot-all" "The dot (.) matches newline characters")
                .global(true),
        )
        .arg(
            arg!(-x --"ignore-whitespace" "Ignore whitespaces in the pattern")
                .global(true),
        )
        .arg(
            arg!(-q --literal "The pattern is a literal string").global(true),
        )
        .arg(
            arg!(-F --flags <FLAGS> "Flags as a string of letters")
                .long_help(help::FLAGS_LONG_HELP)
                .value_parser(flags_parser)
                .global(true),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::matches(),
            commands::replace(),
            commands::split(),
            commands::tokenize(),
            commands::analyze(),
            commands::debug(),
        ])
}

/// Arguments shared by all commands: the pattern and the subject.
fn pattern_and_subject(cmd: Command) -> Command {
    cmd.arg(arg!(<PATTERN>).help("Regular expression"))
        .arg(
            arg!([SUBJECT])
                .help("Subject string")
                .long_help(help::SUBJECT_LONG_HELP),
        )
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

/// Parses the argument of `--flags`.
fn flags_parser(input: &str) -> Result<Flags, anyhow::Error> {
    Ok(Flags::parse(input)?)
}

/// Returns the flags resulting from combining the defaults in the config
/// file with the ones given in the command line.
fn flags(args: &ArgMatches, config: &Config) -> Flags {
    let mut flags =
        args.get_one::<Flags>("flags").copied().unwrap_or(Flags::none());

    let cfg = &config.flags;
    let enabled = [
        (Flag::CaseIndependent, "case-insensitive", cfg.case_insensitive),
        (Flag::MultiLine, "multiline", cfg.multiline),
        (Flag::DotAll, "dot-all", cfg.dot_all),
        (Flag::IgnoreWhitespace, "ignore-whitespace", cfg.ignore_whitespace),
        (Flag::Literal, "literal", cfg.literal),
    ];

    for (flag, arg, default) in enabled {
        if default || args.get_flag(arg) {
            flags.set(flag);
        }
    }

    flags
}

/// Compiles the regular expression given in the `<PATTERN>` argument.
fn regex(args: &ArgMatches, config: &Config) -> anyhow::Result<Regex> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    RegexBuilder::new(pattern.as_str())
        .flags(flags(args, config))
        .build()
        .with_context(|| format!("can not compile `{}`", pattern))
}

/// Returns the `[SUBJECT]` argument, or the standard input if the argument
/// is missing.
fn subject(args: &ArgMatches) -> anyhow::Result<CodepointString> {
    if let Some(subject) = args.get_one::<String>("SUBJECT") {
        return Ok(CodepointString::from(subject.as_str()));
    }
    let mut input = String::new();
    stdin()
        .read_to_string(&mut input)
        .context("can not read subject from standard input")?;
    Ok(CodepointString::from(input))
}

/// Formats a span of the subject as `start..end "text"`.
fn span(subject: &CodepointString, range: Range<usize>) -> String {
    format!(
        "{}..{} {:?}",
        range.start,
        range.end,
        subject.substring(range.start, range.end)
    )
}
