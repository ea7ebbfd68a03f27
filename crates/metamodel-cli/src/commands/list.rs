//! Implementation of the `metamodel list` command.

use metamodel_core::application::SpecificationSummary;

use crate::{
    cli::{ListArgs, ListFormat},
    config::AppConfig,
    context::open_service,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = open_service(&config)?;
    let specs = service.list()?;

    // `--output-format json` wins over the table default.
    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if specs.is_empty() {
                output.info("No types found")?;
                return Ok(());
            }
            output.header(&format!(
                "{:<32} {:<10} {:>5} {:>5} {:>5}  {}",
                "TYPE", "KIND", "PROP", "COLL", "ACT", "TITLE"
            ))?;
            for spec in &specs {
                output.data(&table_row(spec))?;
            }
        }
        ListFormat::Json => output.json(&specs)?,
        ListFormat::List => {
            for spec in &specs {
                output.data(&spec.type_name)?;
            }
        }
        ListFormat::Csv => {
            output.data("type,spec_id,kind,properties,collections,actions,title")?;
            for spec in &specs {
                output.data(&csv_row(spec))?;
            }
        }
    }

    Ok(())
}

fn table_row(spec: &SpecificationSummary) -> String {
    format!(
        "{:<32} {:<10} {:>5} {:>5} {:>5}  {}",
        spec.type_name, spec.kind, spec.properties, spec.collections, spec.actions, spec.title
    )
}

fn csv_row(spec: &SpecificationSummary) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        csv_field(&spec.type_name),
        csv_field(&spec.spec_id),
        spec.kind,
        spec.properties,
        spec.collections,
        spec.actions,
        csv_field(&spec.title)
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
