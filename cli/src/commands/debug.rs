use std::io::{stdout, Write};

use clap::{arg, ArgMatches, Command};
use rematch::re::ascii_tree::operation_ascii_tree;
use rematch::re::parser::Parser;

use crate::config::Config;

pub fn tree() -> Command {
    super::command("tree")
        .about("Print the tree of operations for a regular expression")
        .arg(arg!(<PATTERN>).help("Regular expression"))
        .arg(arg!(--raw "Print the tree as parsed, before optimizing it"))
}

pub fn program() -> Command {
    super::command("program")
        .about("Print the search hints extracted from a regular expression")
        .arg(arg!(<PATTERN>).help("Regular expression"))
}

pub fn debug() -> Command {
    super::command("debug")
        .about("Debug utilities")
        .arg_required_else_help(true)
        .subcommand(tree())
        .subcommand(program())
}

pub fn exec_debug(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("tree", args)) => exec_tree(args, config),
        Some(("program", args)) => exec_program(args, config),
        _ => unreachable!(),
    }
}

fn exec_tree(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let tree = if args.get_flag("raw") {
        let pattern = args.get_one::<String>("PATTERN").unwrap();
        let op = Parser::new()
            .flags(super::flags(args, config))
            .parse(pattern.as_str())?;
        operation_ascii_tree(&op)
    } else {
        let re = super::regex(args, config)?;
        operation_ascii_tree(re.program().root())
    };

    let mut output = String::new();
    ascii_tree::write_tree(&mut output, &tree)?;
    print!("{}", output);

    Ok(())
}

fn exec_program(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let re = super::regex(args, config)?;
    let program = re.program();
    let mut out = stdout().lock();

    writeln!(out, "pattern:         {}", re.as_str())?;
    writeln!(out, "optimized:       {}", program.root())?;
    writeln!(out, "flags:           {:?}", program.flags())?;
    writeln!(out, "prefix:          {:?}", program.prefix())?;
    writeln!(
        out,
        "initial class:   {}",
        program
            .initial_class()
            .map(|class| class.to_string())
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "begins with ^:   {}", program.begins_with_bol())?;
    writeln!(out, "backreferences:  {}", program.has_backrefs())?;
    writeln!(out, "min length:      {}", program.min_length())?;
    writeln!(out, "fixed length:    {:?}", program.fixed_length())?;
    writeln!(out, "groups:          {}", program.max_groups())?;

    Ok(())
}
