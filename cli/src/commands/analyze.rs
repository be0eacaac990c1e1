use clap::{arg, ArgMatches, Command};
use rematch::Segment;
use yansi::Color::Green;
use yansi::Paint;

use crate::config::Config;

pub fn analyze() -> Command {
    super::pattern_and_subject(
        super::command("analyze")
            .about("Split the subject in matching and non-matching segments")
            .arg(arg!(--"no-groups" "Don't print captured groups")),
    )
}

pub fn exec_analyze(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let subject = super::subject(args)?;
    let show_groups =
        config.analyze.show_groups && !args.get_flag("no-groups");

    for segment in re.analyze(subject.clone()) {
        match segment {
            Segment::Match(m) => {
                println!(
                    "{} {}",
                    "match   ".paint(Green).bold(),
                    super::span(&subject, m.range())
                );
                if show_groups {
                    for n in 1..m.group_count() {
                        if let Some(range) = m.group(n) {
                            println!(
                                "  group {}: {}",
                                n,
                                super::span(&subject, range)
                            );
                        }
                    }
                }
            }
            Segment::NonMatch(range) => {
                println!("nonmatch {}", super::span(&subject, range));
            }
        }
    }

    Ok(())
}
