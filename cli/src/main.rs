mod commands;
mod config;
mod help;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{io, panic, process};

use anyhow::anyhow;
use crossterm::tty::IsTty;
use log::*;
use yansi::Color::Red;
use yansi::Paint;

use config::{load_config_from_file, Config};

use crate::commands::cli;

const APP_HELP_TEMPLATE: &str = r#"rematch {version}, backtracking regular expressions from the command line.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".rematch.toml";

fn main() -> anyhow::Result<()> {
    // Enable support for ANSI escape codes in Windows. In other platforms
    // this is a no-op.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // If stdout is not a tty (for example, because it was redirected to a
    // file) turn off colors. This way you can redirect the output to a file
    // without ANSI escape codes messing up the file content.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches_from(wild::args());

    // Kill the process when some panic occurs, instead of leaving it in
    // an unknown state.
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(EXIT_ERROR);
    }));

    // A config file given with `--config` must exist and be valid. The
    // one in the home directory is optional.
    let config = match args.get_one::<PathBuf>("config") {
        Some(config_file) => {
            load_config_from_file(config_file).map_err(|err| {
                anyhow!("invalid config file: {}", err)
            })?
        }
        None => match home::home_dir() {
            Some(home_path) if !home_path.as_os_str().is_empty() => {
                load_config_from_file(&home_path.join(CONFIG_FILE))
                    .unwrap_or_default()
            }
            _ => Config::default(),
        },
    };

    debug!("using config: {:?}", config);

    let result = match args.subcommand() {
        Some(("match", args)) => commands::exec_match(args, &config),
        Some(("replace", args)) => commands::exec_replace(args, &config),
        Some(("split", args)) => commands::exec_split(args, &config),
        Some(("tokenize", args)) => commands::exec_tokenize(args, &config),
        Some(("analyze", args)) => commands::exec_analyze(args, &config),
        Some(("debug", args)) => commands::exec_debug(args, &config),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
