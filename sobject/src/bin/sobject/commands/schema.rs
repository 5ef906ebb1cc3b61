use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color as TableColor, Table};
use serde::Serialize;
use sobject::{MappedTypeSchema, RelationKind, SObjectError, SchemaRegistry, config::NAMESPACE_ENV};

use crate::context::ManifestContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Schema Show",
        commands: &[
            "sobject schema show crm.toml                 # Field tables for every declared type",
            "sobject schema show crm.toml Contact         # Field table for one type",
            "sobject --output json schema show crm.toml   # Machine-readable schemas",
        ],
    },
    ExampleGroup {
        title: "Schema Check",
        commands: &[
            "sobject schema check crm.toml                # Validate names, duplicates and relationship targets",
            "sobject --namespace Acme schema check crm.toml",
        ],
    },
];

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Show the field table and relationships of declared types
    #[command(name = "show")]
    Show {
        /// Path to the TOML manifest
        manifest: PathBuf,

        /// Type to show (optional, shows all if omitted)
        type_key: Option<String>,
    },

    /// Validate a manifest without contacting any remote service
    #[command(name = "check")]
    Check {
        /// Path to the TOML manifest
        manifest: PathBuf,
    },
}

pub fn handle_schema_commands(command: SchemaCommands, namespace: Option<&str>, output: &OutputManager) -> Result<()> {
    match command {
        SchemaCommands::Show { manifest, type_key } => handle_show(&manifest, type_key.as_deref(), namespace, output),
        SchemaCommands::Check { manifest } => handle_check(&manifest, namespace, output),
    }
}

/// Serializable view of one schema.
#[derive(Serialize)]
#[serde(transparent)]
struct SchemaView<'a> {
    schema: &'a MappedTypeSchema,
}

impl TableDisplay for SchemaView<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Local", "Remote", "Identifier", "Parent key", "Custom"]);
        for field in self.schema.fields() {
            let remote = if field.custom {
                output.colored_cell(&field.remote, TableColor::Magenta)
            } else {
                Cell::new(&field.remote)
            };
            table.add_row(vec![
                Cell::new(&field.local),
                remote,
                flag_cell(output, field.is_id),
                flag_cell(output, field.is_parent_id),
                flag_cell(output, field.custom),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} -> {} ({} fields, {} relationships)",
            self.schema.type_key(),
            self.schema.api_name(),
            self.schema.fields().len(),
            self.schema.relationships().len()
        )
    }
}

fn flag_cell(output: &OutputManager, flag: bool) -> Cell {
    if flag {
        output.colored_cell(ICONS.check, TableColor::Yellow)
    } else {
        Cell::new("")
    }
}

fn handle_show(
    manifest: &std::path::Path,
    type_key: Option<&str>,
    namespace: Option<&str>,
    output: &OutputManager,
) -> Result<()> {
    let context = ManifestContext::load(manifest, namespace, None)?;
    let registry = context.session.registry();

    let type_keys = match type_key {
        Some(type_key) => vec![registry.require(type_key)?.type_key().to_string()],
        None => registry.type_keys(),
    };

    if output.is_json() {
        let schemas = type_keys
            .iter()
            .map(|key| registry.require(key))
            .collect::<Result<Vec<_>, SObjectError>>()?;
        let views: Vec<SchemaView<'_>> = schemas.iter().map(|schema| SchemaView { schema: schema.as_ref() }).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    output.verbose(&format!("Loaded {}", context.path.display()));
    for key in &type_keys {
        let schema = registry.require(key)?;
        output.heading(&format!("{} ({})", schema.type_key(), schema.api_name()));
        output.display(&SchemaView { schema: schema.as_ref() })?;
        show_relationships(&schema, registry, output);
    }
    Ok(())
}

fn show_relationships(schema: &MappedTypeSchema, registry: &SchemaRegistry, output: &OutputManager) {
    for relation in schema.relationships() {
        let icon = match relation.kind {
            RelationKind::Parent => ICONS.parent,
            RelationKind::Children => ICONS.children,
        };
        output.bullet(&format!(
            "{icon} {} {} {} via {}",
            relation.name, ICONS.arrow, relation.target, relation.foreign_key
        ));
    }
    for incoming in registry.incoming_relations(schema.type_key()) {
        output.key_value(
            "referenced by",
            &format!("{}.{} ({})", incoming.source, incoming.name, incoming.foreign_key),
        );
    }
}

fn handle_check(manifest: &std::path::Path, namespace: Option<&str>, output: &OutputManager) -> Result<()> {
    let parsed = ManifestContext::read(manifest)?;
    output.info(&format!("Checking {} declared type(s)", parsed.objects.len()));

    let has_custom_names = parsed
        .objects
        .iter()
        .any(|object| object.fields.iter().any(|field| field.custom) || object.parents.iter().any(|parent| parent.custom));
    let namespaced = parsed.namespace.is_some() || namespace.is_some() || std::env::var_os(NAMESPACE_ENV).is_some();
    if has_custom_names && !namespaced {
        output.warning("No namespace configured; custom fields use the bare __c suffix");
    }

    match ManifestContext::load(manifest, namespace, None) {
        Ok(context) => {
            for key in context.session.registry().type_keys() {
                output.bullet(&key);
            }
            output.success("Manifest is valid");
            Ok(())
        }
        Err(err) => {
            match err.downcast_ref::<SObjectError>() {
                Some(SObjectError::Validation(validation)) => {
                    for issue in &validation.issues {
                        output.error(&format!("{}: {}", issue.field, issue.message));
                    }
                }
                Some(other) => output.error(&other.to_string()),
                None => output.error(&format!("{err:#}")),
            }
            bail!("Manifest {} is invalid", manifest.display())
        }
    }
}
