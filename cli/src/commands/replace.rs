use clap::{arg, ArgMatches, Command};
use rematch::CodepointString;

use crate::config::Config;
use crate::help;

pub fn replace() -> Command {
    super::command("replace")
        .about("Replace all the matches of a regular expression")
        .arg(arg!(<PATTERN>).help("Regular expression"))
        .arg(
            arg!(<REPLACEMENT>)
                .help("Replacement for each match")
                .long_help(help::REPLACEMENT_LONG_HELP),
        )
        .arg(
            arg!([SUBJECT])
                .help("Subject string")
                .long_help(help::SUBJECT_LONG_HELP),
        )
}

pub fn exec_replace(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let subject = super::subject(args)?;
    let template = CodepointString::from(
        args.get_one::<String>("REPLACEMENT").unwrap().as_str(),
    );

    println!("{}", re.replace(&subject, &template)?);

    Ok(())
}
