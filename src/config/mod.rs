mod types;

pub use types::{Config, FormatSection};

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load the configuration. An explicit path wins; otherwise `gdfmt.toml` is
/// searched from the current directory upward, and defaults apply when no
/// file exists.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => read_config(path),
        None => match find_config_file() {
            Some(found) => read_config(&found),
            None => Ok(Config::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;
    loop {
        let candidate = current.join("gdfmt.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::IndentStyle;

    #[test]
    fn test_defaults_when_empty() {
        let config: Config = toml::from_str("").unwrap();
        let options = config.format_options(None, None, false);
        assert_eq!(options.indent_style, IndentStyle::Tabs);
        assert_eq!(options.max_line_length, 100);
        assert!(!options.single_blank_lines);
    }

    #[test]
    fn test_config_values_apply() {
        let config: Config = toml::from_str(
            r#"
            exclude = ["addons/"]

            [format]
            indent_using = "spaces"
            indent_size = 2
            line_length = 80
            single_blank_lines = true

            [format.blank_lines]
            func = 1
            "class/func" = 0
            "#,
        )
        .unwrap();
        let options = config.format_options(None, None, false);
        assert_eq!(options.indent_style, IndentStyle::Spaces(2));
        assert_eq!(options.max_line_length, 80);
        assert!(options.single_blank_lines);
        assert_eq!(options.global_blank_lines.get("func"), Some(&1));
        assert!(config.is_excluded(Path::new("project/addons/foo.gd")));
        assert!(!config.is_excluded(Path::new("project/scripts/foo.gd")));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: Config = toml::from_str(
            r#"
            [format]
            indent_using = "spaces"
            indent_size = 2
            line_length = 80
            "#,
        )
        .unwrap();
        let options = config.format_options(Some(7), Some(120), true);
        assert_eq!(options.indent_style, IndentStyle::Spaces(7));
        assert_eq!(options.max_line_length, 120);
        assert!(options.single_blank_lines);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/gdfmt.toml")));
        assert!(result.is_err());
    }
}
