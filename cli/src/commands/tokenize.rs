use clap::{ArgMatches, Command};

use crate::config::Config;

pub fn tokenize() -> Command {
    super::pattern_and_subject(
        super::command("tokenize")
            .about("Print the tokens separated by a regular expression")
            .long_about(
                "Print the tokens separated by a regular expression

The regular expression must not match the empty string.",
            ),
    )
}

pub fn exec_tokenize(
    args: &ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let subject = super::subject(args)?;

    for token in re.tokenize(subject)? {
        println!("{:?}", token);
    }

    Ok(())
}
