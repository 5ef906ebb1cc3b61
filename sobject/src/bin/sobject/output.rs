use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered as a table or a single line
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    pub fn is_json(&self) -> bool {
        self.options.output_format == OutputFormat::Json
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(self);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    fn decorate(&self, icon: &str, color: colored::Color, message: &str) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    fn silenced(&self) -> bool {
        self.options.quiet || self.is_json()
    }

    pub fn success(&self, message: &str) {
        if !self.silenced() {
            println!("{}", self.decorate(ICONS.success, THEME.success, message));
        }
    }

    /// Errors go to stderr and ignore `--quiet`.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.decorate(ICONS.error, THEME.error, message));
    }

    pub fn warning(&self, message: &str) {
        if !self.silenced() {
            println!("{}", self.decorate(ICONS.warning, THEME.warning, message));
        }
    }

    /// Only shown with `--verbose`, on stderr.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.decorate(ICONS.arrow, THEME.muted, message));
        }
    }

    pub fn info(&self, message: &str) {
        if !self.silenced() {
            println!("{}", self.decorate(ICONS.info, THEME.info, message));
        }
    }

    /// Display a heading
    pub fn heading(&self, text: &str) {
        if self.silenced() {
            return;
        }
        let output = if self.options.no_color {
            format!("\n{text}\n{}", "=".repeat(text.len()))
        } else {
            format!("\n{}", text.color(THEME.primary).bold())
        };
        println!("{output}");
    }

    /// Display a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        if self.silenced() {
            return;
        }
        let output = if self.options.no_color {
            format!("{key}: {value}")
        } else {
            format!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value))
        };
        println!("{output}");
    }

    /// Display a bullet list item
    pub fn bullet(&self, text: &str) {
        if self.silenced() {
            return;
        }
        let output = if self.options.no_color {
            format!("  {} {text}", ICONS.bullet)
        } else {
            format!("  {} {text}", ICONS.bullet.color(THEME.muted))
        };
        println!("{output}");
    }

    /// Create a themed table
    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    /// Add themed header to table
    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|header| {
                let cell = Cell::new(header).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(header_cells);
    }

    /// A cell colored with `color` unless color is disabled
    pub fn colored_cell(&self, text: impl ToString, color: TableColor) -> Cell {
        let cell = Cell::new(text);
        if self.options.no_color { cell } else { cell.fg(color) }
    }
}
