use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

// Every section and field is optional in the file: missing values fall
// back to the defaults below, so a partial config layers instead of
// failing deserialization.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Ignore patterns applied on top of the built-in defaults
    pub ignore_patterns: Vec<String>,

    /// Default indexing settings
    pub index: IndexConfig,

    /// Default digest settings
    pub digest: DigestConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig
{
    /// Hard cap on files processed per run
    pub max_files: usize,

    /// Keep test files in the index
    pub include_tests: bool,

    /// Extra detector identifiers to enable (reserved for custom rule sets)
    pub detectors: Vec<String>,

    /// Artifact path used when `rdg index` is run without `-o`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig
{
    /// Inline special-file contents into the digest
    pub include_special_files: bool,
}

impl Default for IndexConfig
{
    fn default() -> Self
    {
        Self {
            max_files: 2000,
            include_tests: true,
            detectors: Vec::new(),
            output_file: None,
        }
    }
}

impl Default for DigestConfig
{
    fn default() -> Self
    {
        Self { include_special_files: true }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["repodigest.toml", "repodigest.yaml", "repodigest.json", ".repodigest.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with REPODIGEST_ prefix
    builder = builder.add_source(config::Environment::with_prefix("REPODIGEST").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("repodigest.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_partial_config_layers_over_defaults()
    {
        // Only one section, only one field: everything else keeps its
        // default instead of failing deserialization.
        let parsed: Config =
            toml::from_str("ignore_patterns = [\"generated/**\"]\n\n[index]\nmax_files = 50\n")
                .unwrap();

        assert_eq!(parsed.ignore_patterns, vec!["generated/**".to_string()]);
        assert_eq!(parsed.index.max_files, 50);
        assert!(parsed.index.include_tests);
        assert!(parsed.index.output_file.is_none());
        assert!(parsed.digest.include_special_files);
    }

    #[test]
    fn test_default_config_round_trips_through_toml()
    {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();

        assert_eq!(back.index.max_files, 2000);
        assert!(back.index.output_file.is_none());
    }
}
