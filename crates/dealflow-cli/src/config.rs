//! CLI configuration loaded from a TOML file.
//!
//! Reads the `[demo]` section from the config path given on the command
//! line. Every field falls back to its default independently, so a missing
//! file, a missing section, or a mistyped value never aborts the demo.

use std::path::Path;

/// How log lines are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings loaded from the `[demo]` section of the config file.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Multiplier applied to scripted step delays (1.0 = original timing).
    pub pace: f32,
    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pace: 1.0,
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, falling back to defaults field by
    /// field when the file, the `[demo]` section, or a value is missing.
    pub fn load(path: &Path) -> Self {
        let defaults = Self::default();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return defaults,
        };

        let table: toml::Table = match content.parse() {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "config file is not valid TOML");
                return defaults;
            }
        };

        let demo = match table.get("demo") {
            Some(toml::Value::Table(demo)) => demo,
            _ => return defaults,
        };

        Self {
            pace: demo
                .get("pace")
                .and_then(toml::Value::as_float)
                .map(|pace| pace.max(0.0) as f32)
                .unwrap_or(defaults.pace),
            log_format: demo
                .get("log_format")
                .and_then(toml::Value::as_str)
                .and_then(|value| match value {
                    "pretty" => Some(LogFormat::Pretty),
                    "json" => Some(LogFormat::Json),
                    _ => None,
                })
                .unwrap_or(defaults.log_format),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = CliConfig::load(Path::new("/nonexistent/dealflow.toml"));
        assert_eq!(config.pace, 1.0);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn full_section_is_read() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[demo]\npace = 0.5\nlog_format = \"json\"").expect("write");

        let config = CliConfig::load(file.path());
        assert_eq!(config.pace, 0.5);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn partial_section_falls_back_per_field() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[demo]\npace = 2.0").expect("write");

        let config = CliConfig::load(file.path());
        assert_eq!(config.pace, 2.0);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn bad_values_fall_back() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[demo]\npace = -3.0\nlog_format = \"loud\"").expect("write");

        let config = CliConfig::load(file.path());
        // Negative pace is clamped, unknown format falls back.
        assert_eq!(config.pace, 0.0);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }
}
