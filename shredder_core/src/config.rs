use crate::format::FormatTag;
use crate::transport::{DEFAULT_FILE_NAME, MAX_INPUT_SIZE_BYTES, TransportPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct LimitSettings {
    #[serde(default = "default_max_input_size_bytes")]
    pub max_input_size_bytes: u64,
}

pub fn default_max_input_size_bytes() -> u64 {
    MAX_INPUT_SIZE_BYTES
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_input_size_bytes: default_max_input_size_bytes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub default_format: FormatTag,
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
}

pub fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            default_format: FormatTag::default(),
            default_file_name: default_file_name(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct RngSettings {
    /// Fixed seed for reproducible output. Unset means a fresh seed per run.
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

pub fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct ShredderConfig {
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub rng: RngSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

impl ShredderConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The policy the transport layer checks requests against.
    pub fn transport_policy(&self) -> TransportPolicy {
        TransportPolicy {
            max_input_size_bytes: self.limits.max_input_size_bytes,
            default_file_name: self.generator.default_file_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ShredderConfig::from_toml_str("").unwrap();
        assert_eq!(config.limits.max_input_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.generator.default_format, FormatTag::Doc);
        assert_eq!(config.generator.default_file_name, "generated_file");
        assert_eq!(config.rng.seed, None);
        assert_eq!(config.output.directory, PathBuf::from("."));
    }

    #[test]
    fn parses_every_section() {
        let config = ShredderConfig::from_toml_str(
            r#"
            [limits]
            max-input-size-bytes = 2048

            [generator]
            default-format = "png"
            default-file-name = "noise"

            [rng]
            seed = 42

            [output]
            directory = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_input_size_bytes, 2048);
        assert_eq!(config.generator.default_format, FormatTag::Png);
        assert_eq!(config.generator.default_file_name, "noise");
        assert_eq!(config.rng.seed, Some(42));
        assert_eq!(config.output.directory, PathBuf::from("out"));

        let policy = config.transport_policy();
        assert_eq!(policy.max_input_size_bytes, 2048);
        assert_eq!(policy.default_file_name, "noise");
    }

    #[test]
    fn rejects_unknown_fields_and_formats() {
        assert!(ShredderConfig::from_toml_str("[limits]\nratio = 0.5\n").is_err());
        assert!(
            ShredderConfig::from_toml_str("[generator]\ndefault-format = \"exe\"\n").is_err()
        );
        assert!(ShredderConfig::from_toml_str("[telemetry]\n").is_err());
    }

    #[test]
    fn load_from_file_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rng]\nseed = 7").unwrap();
        let config = ShredderConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.rng.seed, Some(7));

        let missing = file.path().with_extension("missing");
        match ShredderConfig::load_from_file(&missing) {
            Err(ConfigError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected ConfigError::Read, got {other:?}"),
        }

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[rng\nseed = 7").unwrap();
        assert!(matches!(
            ShredderConfig::load_from_file(broken.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
