use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default flags for all commands. The flags given in the command line
    /// are added to these ones.
    pub flags: FlagsConfig,
    /// Configuration for the `analyze` command.
    pub analyze: AnalyzeConfig,
}

/// Flags used when compiling regular expressions.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FlagsConfig {
    /// Letters match both their uppercase and lowercase forms.
    #[serde(default)]
    pub case_insensitive: bool,
    /// `^` and `$` match at the start and end of each line.
    #[serde(default)]
    pub multiline: bool,
    /// The dot (.) matches newline characters too.
    #[serde(default)]
    pub dot_all: bool,
    /// Whitespaces in the pattern are ignored.
    #[serde(default)]
    pub ignore_whitespace: bool,
    /// Patterns are literal strings.
    #[serde(default)]
    pub literal: bool,
}

/// Configuration for the `analyze` command.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeConfig {
    /// Show the groups captured by each match.
    pub show_groups: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> AnalyzeConfig {
        AnalyzeConfig { show_groups: true }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}
