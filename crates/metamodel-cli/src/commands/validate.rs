//! `metamodel validate`: load every type and report validation findings.

use std::{io::IsTerminal as _, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use metamodel_core::domain::{Severity, ValidationReport};

use crate::{
    cli::{OutputFormat, ValidateArgs},
    config::AppConfig,
    context::open_service,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let fail_on_warnings = args.strict || config.validation.fail_on_warnings;

    let spinner = spinner(&output);
    spinner.set_message("Building metamodel...");
    let result = open_service(&config).and_then(|service| service.validate().map_err(CliError::from));
    spinner.finish_and_clear();
    let report = result?;

    if output.is_json() {
        output.json(&report)?;
    } else {
        for finding in report.findings() {
            match finding.severity {
                Severity::Error => output.error(&finding.to_string())?,
                Severity::Warning => output.warning(&finding.to_string())?,
            }
        }
    }

    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );

    if fails(&report, fail_on_warnings) {
        return Err(CliError::ValidationFailed {
            errors: report.error_count(),
            warnings: report.warning_count(),
        });
    }

    if !output.is_json() {
        output.success(&format!(
            "Metamodel is valid ({} warning(s))",
            report.warning_count()
        ))?;
    }
    Ok(())
}

fn fails(report: &ValidationReport, fail_on_warnings: bool) -> bool {
    report.has_errors() || (fail_on_warnings && report.warning_count() > 0)
}

/// A spinner on stderr, only for interactive human output.
fn spinner(output: &OutputManager) -> ProgressBar {
    if output.is_quiet()
        || output.format() != OutputFormat::Human
        || !std::io::stderr().is_terminal()
    {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamodel_core::domain::{TypeName, ValidationFinding};

    #[test]
    fn warnings_fail_only_when_asked() {
        let mut report = ValidationReport::new();
        report.push(ValidationFinding::warning(
            &TypeName::new("crm.Customer"),
            "layout",
            "orphan node",
        ));
        assert!(!fails(&report, false));
        assert!(fails(&report, true));

        report.push(ValidationFinding::error(
            &TypeName::new("crm.Order"),
            "unique-object-spec-id",
            "duplicate",
        ));
        assert!(fails(&report, false));
    }

    #[test]
    fn empty_report_passes() {
        assert!(!fails(&ValidationReport::new(), true));
    }
}
