//! Configuration command handler.
//!
//! Prints the resolved configuration as pretty JSON, each value paired with
//! the layer it came from (`default`, `file`, `env` or `flag`).

use crate::config::ConfigResolved;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(resolved: &ConfigResolved, out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "save_path": {
            "value": config.save_path,
            "source": sources.save_path,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "autosave_debounce_ms": {
            "value": config.autosave_debounce_ms,
            "source": sources.autosave_debounce_ms,
        },
        "journal_path": {
            "value": config.journal_path,
            "source": sources.journal_path,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigSources, ValueSource};
    use std::path::PathBuf;

    #[test]
    fn test_cfg_displays_values_and_sources() {
        let mut sources = ConfigSources::default();
        sources.seed = ValueSource::Env;
        let resolved = ConfigResolved {
            config: Config {
                seed: Some(42),
                journal_path: Some(PathBuf::from("deals.jsonl")),
                ..Config::default()
            },
            sources,
        };
        let mut out = Vec::new();
        handle_cfg_command(&resolved, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["save_path"]["value"], "chipdeck-save.json");
        assert_eq!(json["save_path"]["source"], "default");
        assert_eq!(json["seed"]["value"], 42);
        assert_eq!(json["seed"]["source"], "env");
        assert_eq!(json["autosave_debounce_ms"]["value"], 500);
        assert_eq!(json["journal_path"]["value"], "deals.jsonl");
        assert!(output.contains("\n  "), "output should be pretty-printed");
    }
}
