//! `metamodel layout`: print the effective layout of a type as JSON.
//!
//! The output is a complete layout document: the authored file completed
//! with every member it left out, or the derived default when there is no
//! file. Redirect it to `<TYPE>.layout.json` to start a custom layout.

use tracing::warn;

use crate::{
    cli::LayoutArgs,
    config::AppConfig,
    context::open_service,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: LayoutArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = open_service(&config)?;

    let json = service
        .layout_json(&args.type_name)?
        .ok_or_else(|| CliError::LayoutUnavailable {
            type_name: args.type_name.clone(),
        })?;

    let orphans = service.describe(&args.type_name)?.layout_orphans;
    for orphan in &orphans {
        warn!(type_name = %args.type_name, member = %orphan, "layout node matches no member");
    }

    output.data(&json)?;
    Ok(())
}
