use clap::{arg, ArgMatches, Command};
use rematch::{CodepointString, MatchResult, Segment};
use yansi::Color::Green;
use yansi::Paint;

use crate::config::Config;

pub fn matches() -> Command {
    super::pattern_and_subject(
        super::command("match")
            .about("Print the first match of a regular expression")
            .arg(arg!(-a --all "Print all the matches, not just the first"))
            .arg(
                arg!(-w --whole "Match the whole subject")
                    .conflicts_with("all"),
            ),
    )
}

fn print_match(subject: &CodepointString, m: &MatchResult, groups: usize) {
    println!("{}", super::span(subject, m.range()).paint(Green).bold());
    for n in 1..groups {
        match m.group(n) {
            Some(range) => {
                println!("  {}: {}", n, super::span(subject, range))
            }
            None => println!("  {}: -", n),
        }
    }
}

pub fn exec_match(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let subject = super::subject(args)?;
    let groups = re.program().max_groups();

    if args.get_flag("all") {
        let mut found = false;
        for segment in re.analyze(subject.clone()) {
            if let Segment::Match(m) = segment {
                print_match(&subject, &m, groups);
                found = true;
            }
        }
        if !found {
            println!("no match");
        }
        return Ok(());
    }

    let m = if args.get_flag("whole") {
        re.match_whole(&subject)
    } else {
        re.find(&subject)
    };

    match m {
        Some(m) => print_match(&subject, &m, groups),
        None => println!("no match"),
    }

    Ok(())
}
