use clap::{ArgMatches, Command};

use crate::config::Config;

pub fn split() -> Command {
    super::pattern_and_subject(
        super::command("split")
            .about("Split the subject at each match of a regular expression"),
    )
}

pub fn exec_split(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let subject = super::subject(args)?;

    for piece in re.split(&subject) {
        println!("{:?}", piece);
    }

    Ok(())
}
