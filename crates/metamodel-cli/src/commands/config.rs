//! `metamodel config`: show the effective configuration.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.data(&value)?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.data(&serialised)?;
        }

        ConfigCommands::Path => {
            output.data(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let list = |items: &[String]| items.join(",");
    match key {
        "sources.classes_dir" => Ok(config.sources.classes_dir.display().to_string()),
        "sources.layouts_dir" => Ok(config.sources.layouts_dir.display().to_string()),
        "persistence.mechanism" => Ok(config.persistence.mechanism.clone()),
        "persistence.synthetic_member_prefixes" => {
            Ok(list(&config.persistence.synthetic_member_prefixes))
        }
        "persistence.proxy_class_suffixes" => Ok(list(&config.persistence.proxy_class_suffixes)),
        "validation.explicit_object_type" => {
            Ok(config.validation.explicit_object_type.to_string())
        }
        "validation.fail_on_warnings" => Ok(config.validation.fail_on_warnings.to_string()),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.clone()),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_keys() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "persistence.mechanism").unwrap(), "enhancement");
        assert_eq!(
            get_config_value(&cfg, "persistence.proxy_class_suffixes").unwrap(),
            "$$Enhanced,$$Proxy"
        );
        assert_eq!(get_config_value(&cfg, "sources.classes_dir").unwrap(), "classes");
        assert_eq!(get_config_value(&cfg, "validation.fail_on_warnings").unwrap(), "false");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }
}
