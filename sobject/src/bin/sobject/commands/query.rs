use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value;
use sobject::{AttributeOptions, Attributes, Conditions, Record, SelectQuery, types::render_value};

use crate::context::{ManifestContext, parse_condition};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Preview Queries",
        commands: &[
            "sobject query crm.toml Contact                              # SELECT every mapped field",
            "sobject query crm.toml Contact --where last_name=Doe        # Add an equality condition",
            "sobject query crm.toml Contact --where last_name=Doe --exists",
        ],
    },
    ExampleGroup {
        title: "Run Against Local Rows",
        commands: &[
            "sobject query crm.toml Contact --data rows.json --where account_id=001000000000001",
            "sobject --output json query crm.toml Account --data rows.json",
        ],
    },
];

#[derive(Args)]
pub struct QueryArgs {
    /// Path to the TOML manifest
    pub manifest: PathBuf,

    /// Type to query
    pub type_key: String,

    /// Equality condition on a local field (repeatable)
    #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_condition)]
    pub conditions: Vec<(String, Value)>,

    /// Only check whether a matching record exists
    #[arg(long)]
    pub exists: bool,

    /// JSON file of rows keyed by api name; the query runs against them in memory
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,
}

/// Records returned by a query, as local attributes.
#[derive(Serialize)]
struct QueryResult {
    statement: String,
    columns: Vec<String>,
    records: Vec<Attributes>,
}

impl QueryResult {
    fn new(statement: String, columns: Vec<String>, records: &[Record]) -> Self {
        let options = AttributeOptions {
            include_parent_ids: true,
        };
        Self {
            statement,
            columns,
            records: records.iter().map(|record| record.to_attributes(options)).collect(),
        }
    }
}

impl TableDisplay for QueryResult {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        let headers: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        output.add_table_header(&mut table, &headers);
        for record in &self.records {
            table.add_row(
                self.columns
                    .iter()
                    .map(|column| Cell::new(record.get(column).map(render_value).unwrap_or_default()))
                    .collect::<Vec<_>>(),
            );
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{} record(s)", self.records.len())
    }
}

pub fn handle_query(args: QueryArgs, namespace: Option<&str>, output: &OutputManager) -> Result<()> {
    let context = ManifestContext::load(&args.manifest, namespace, args.data.as_deref())?;
    let repo = context
        .session
        .repo(&args.type_key)
        .with_context(|| format!("Type '{}' is not declared in {}", args.type_key, args.manifest.display()))?;

    let conditions: Conditions = args.conditions.into_iter().collect();
    let statement = if args.exists {
        SelectQuery::existence(repo.schema(), &conditions)?
    } else {
        SelectQuery::all_fields(repo.schema(), &conditions)?
    };

    if context.client.is_none() {
        if output.is_json() {
            println!("{}", serde_json::json!({ "statement": statement.to_string() }));
        } else {
            output.key_value("statement", &statement.to_string());
            output.info("Pass --data to run the statement against local rows");
        }
        return Ok(());
    }

    output.verbose(&statement.to_string());
    if args.exists {
        let found = repo.exists(conditions)?;
        if output.is_json() {
            println!("{}", serde_json::json!({ "statement": statement.to_string(), "exists": found }));
        } else if found {
            output.success(&format!("A matching {} exists", repo.api_name()));
        } else {
            output.warning(&format!("No matching {}", repo.api_name()));
        }
        return Ok(());
    }

    let records = repo.find_where(conditions)?;
    let columns = repo.schema().local_field_names().map(str::to_string).collect();
    output.display(&QueryResult::new(statement.to_string(), columns, &records))
}
