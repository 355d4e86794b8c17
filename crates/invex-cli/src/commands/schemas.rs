//! Schemas command - inspect and export record schemas.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invex_core::RecordSchema;

use super::{load_config, load_registry};

/// Arguments for the schemas command.
#[derive(Args)]
pub struct SchemasArgs {
    /// Schema file to use instead of the configured or built-in schemas
    #[arg(short, long, global = true)]
    schemas: Option<PathBuf>,

    #[command(subcommand)]
    command: SchemasCommand,
}

#[derive(Subcommand)]
enum SchemasCommand {
    /// List registered schemas in extraction order
    List,

    /// Show one schema in detail
    Show {
        /// Schema id (e.g., "line_items")
        id: String,
    },

    /// Export the registry as a JSON schema file
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: SchemasArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = load_registry(args.schemas.as_deref(), &config)?;

    match args.command {
        SchemasCommand::List => {
            println!("{}", style("Registered schemas:").bold());
            for schema in registry.all() {
                println!(
                    "  {:<18} {:<5} {:>2} fields  {}",
                    style(schema.id()).cyan(),
                    schema.cardinality().to_string(),
                    schema.fields().len(),
                    schema.title()
                );
            }
        }
        SchemasCommand::Show { id } => {
            print!("{}", describe_schema(registry.get(&id)?));
        }
        SchemasCommand::Export { output } => {
            let json = registry.to_json_pretty()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!(
                        "{} Exported {} schemas to {}",
                        style("✓").green(),
                        registry.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn describe_schema(schema: &RecordSchema) -> String {
    let mut output = String::new();
    output.push_str(&format!("{} ({})\n", schema.title(), schema.id()));
    output.push_str(&format!("Cardinality: {}\n", schema.cardinality()));
    output.push_str(&format!("Description: {}\n", schema.description()));

    output.push_str("\nFields:\n");
    for field in schema.fields() {
        output.push_str(&format!("  {:<22} {}\n", field.name(), field.description()));
        for example in field.examples() {
            output.push_str(&format!("  {:<22}   e.g. {}\n", "", example.output));
        }
    }

    if !schema.examples().is_empty() {
        output.push_str(&format!("\nRecord examples: {}\n", schema.examples().len()));
    }
    output
}
