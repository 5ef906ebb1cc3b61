mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{Styles, styling::AnsiColor},
};

use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::fmt::Write;

use commands::{
    query::{QueryArgs, handle_query},
    schema::{SchemaCommands, handle_schema_commands},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("SOBJECT_NAMESPACE", "Namespace for custom remote names when the manifest declares none"),
    ("RUST_LOG", "Log filter, e.g. sobject=debug to trace issued queries"),
];

/// Inspect CRM object mappings declared in TOML manifests
#[derive(Parser)]
#[command(name = "sobject", version)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Namespace for custom remote names (overrides SOBJECT_NAMESPACE)
    #[arg(long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or validate manifest declarations
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Preview or run the query for a declared type
    Query(QueryArgs),
}

fn build_cli_command(use_color: bool) -> Command {
    let mut command = Cli::command()
        .after_long_help(render_environment(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .styles(help_styles());
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Examples:", THEME.highlight, use_color));
    for (index, group) in groups.iter().enumerate() {
        let _ = writeln!(buffer, "  {}", stylize(group.title, THEME.primary, use_color));
        for command in group.commands {
            let _ = writeln!(buffer, "    {} {command}", ICONS.arrow);
        }
        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }
    buffer
}

fn render_environment(use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", THEME.highlight, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(buffer, "  {}  {description}", stylize(key, THEME.key, use_color));
    }
    buffer
}

fn stylize(text: &str, color: ThemeColor, use_color: bool) -> String {
    if use_color { text.color(color).bold().to_string() } else { text.to_string() }
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .header(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
        .error(AnsiColor::Red.on_default().bold())
}

fn main() {
    env_logger::init();

    let use_color = ShouldColorize::from_env().should_colorize();
    let cli = match build_cli_command(use_color)
        .try_get_matches()
        .and_then(|matches| Cli::from_arg_matches(&matches))
    {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = execute(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });
    let namespace = cli.namespace.as_deref();

    match cli.command {
        Commands::Schema(schema_cmd) => handle_schema_commands(schema_cmd, namespace, &output),
        Commands::Query(args) => handle_query(args, namespace, &output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        build_cli_command(false).debug_assert();
    }

    #[test]
    fn parses_query_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sobject",
            "query",
            "crm.toml",
            "Contact",
            "--where",
            "last_name=Doe",
            "--where",
            "score=3",
            "--namespace",
            "Acme",
            "--output",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.namespace.as_deref(), Some("Acme"));
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.type_key, "Contact");
                assert_eq!(args.conditions.len(), 2);
                assert_eq!(args.conditions[1].1, serde_json::json!(3));
                assert!(args.data.is_none());
            }
            Commands::Schema(_) => panic!("expected the query command"),
        }
    }

    #[test]
    fn malformed_condition_is_rejected() {
        assert!(Cli::try_parse_from(["sobject", "query", "crm.toml", "Contact", "--where", "nonsense"]).is_err());
    }

    #[test]
    fn examples_render_without_color() {
        let rendered = render_examples(commands::query::EXAMPLES, false);
        assert!(rendered.starts_with("Examples:"));
        assert!(rendered.contains("sobject query crm.toml Contact"));
    }
}
