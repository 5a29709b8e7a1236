use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::source_location::TextLocation;
use crate::{return_config_error, return_file_error};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "lowering.toml";

// Rough guesses to avoid reallocating in the common case
pub const MINIMUM_STRING_TABLE_CAPACITY: usize = 32;
pub const EXPECTED_PATH_COMPONENTS: usize = 4; // Most lvalues are a root plus a few projections

pub const DEFAULT_MAX_PATH_DEPTH: usize = 256;

/// Settings for lvalue lowering.
/// Read from the `[lowering]` table of the project's config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoweringConfig {
    /// Include an indented dump of the rejected node in builder errors
    pub dump_rejected_nodes: bool,

    /// Nesting limit for the path builder's recursion
    pub max_path_depth: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    lowering: LoweringConfig,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        LoweringConfig {
            dump_rejected_nodes: true,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}

impl LoweringConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, CompilerError> {
        let file: ConfigFile = match toml::from_str(source) {
            Ok(file) => file,
            Err(e) => {
                return_config_error!(
                    format!("Could not parse lowering config: {e}"),
                    TextLocation::default(),
                    { PrimarySuggestion => "Check the [lowering] table for typos" }
                )
            }
        };

        file.lowering.validate()?;
        Ok(file.lowering)
    }

    pub fn from_file(path: &Path) -> Result<Self, CompilerError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => return_file_error!(path, format!("Could not read lowering config: {e}")),
        };

        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), CompilerError> {
        if self.max_path_depth == 0 {
            return_config_error!(
                "max_path_depth must be at least 1",
                TextLocation::default(),
                { PrimarySuggestion => "Remove the setting to use the default depth" }
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler_frontend::compiler_errors::ErrorType;
    use std::io::Write;

    #[test]
    fn missing_table_uses_defaults() {
        let config = LoweringConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, LoweringConfig::default());
        assert!(config.dump_rejected_nodes);
        assert_eq!(config.max_path_depth, DEFAULT_MAX_PATH_DEPTH);
    }

    #[test]
    fn reads_lowering_table() {
        let config = LoweringConfig::from_toml_str(
            "[lowering]\ndump_rejected_nodes = false\nmax_path_depth = 8\n",
        )
        .expect("config should parse");

        assert!(!config.dump_rejected_nodes);
        assert_eq!(config.max_path_depth, 8);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = LoweringConfig::from_toml_str("[lowering]\nmax_path_depth = 3\n")
            .expect("config should parse");

        assert!(config.dump_rejected_nodes);
        assert_eq!(config.max_path_depth, 3);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_depth() {
        let unknown = LoweringConfig::from_toml_str("[lowering]\nretain_everything = true\n")
            .expect_err("unknown keys should be rejected");
        assert_eq!(unknown.error_type, ErrorType::Config);

        let zero = LoweringConfig::from_toml_str("[lowering]\nmax_path_depth = 0\n")
            .expect_err("zero depth should be rejected");
        assert_eq!(zero.error_type, ErrorType::Config);
    }

    #[test]
    fn loads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[lowering]\nmax_path_depth = 12").expect("write config");

        let config = LoweringConfig::from_file(file.path()).expect("config should load");
        assert_eq!(config.max_path_depth, 12);

        let missing = tempfile::tempdir().expect("temp dir");
        let error = LoweringConfig::from_file(&missing.path().join(CONFIG_FILE_NAME))
            .expect_err("missing file should fail");
        assert_eq!(error.error_type, ErrorType::File);
    }
}
