//! Runtime utilities
//!
//! This module is only used by the binaries and holds the configuration
//! file format and logging setup.

mod config;
pub mod logging;
mod shopify;

use std::path::Path;

pub use config::Config;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

/// Prefix of the environment variables that map onto config fields
const ENV_PREFIX: &str = "SHOPIFY_MCP_";

/// Separator to use when drilling down into nested options in the env figment
const ENV_NESTED_SEPARATOR: &str = "__";

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split(ENV_NESTED_SEPARATOR)
}

/// Read configuration from environment variables only (when no config file is provided)
#[allow(clippy::result_large_err)]
pub fn read_config_from_env() -> Result<Config, figment::Error> {
    Figment::new().join(env_provider()).extract()
}

/// Read in a config from a YAML file, filling in any missing values from the environment.
///
/// `${env.VAR_NAME}` references in the file are expanded before it is parsed.
#[allow(clippy::result_large_err)]
pub fn read_config(yaml_path: impl AsRef<Path>) -> Result<Config, figment::Error> {
    let yaml_path = yaml_path.as_ref();
    let content = std::fs::read_to_string(yaml_path).map_err(|e| {
        figment::Error::from(format!(
            "failed to read config file '{}': {e}",
            yaml_path.display()
        ))
    })?;

    let expanded = shopify_mcp_server::env_expansion::expand_yaml(&content)
        .map_err(|e| figment::Error::from(e.to_string()))?;

    Figment::new()
        .join(env_provider())
        .join(Yaml::string(&expanded))
        .extract()
}

#[cfg(test)]
mod test {
    use secrecy::ExposeSecret as _;
    use tracing::Level;

    use super::logging::{FormatStyle, LogRotationKind};
    use super::{read_config, read_config_from_env};

    #[test]
    fn empty_environment_gives_defaults() {
        figment::Jail::expect_with(|_| {
            let config = read_config_from_env()?;

            assert_eq!(config.logging.level, Level::INFO);
            assert_eq!(config.logging.format, FormatStyle::Full);
            assert_eq!(config.shopify.api_version(), "2025-01");
            assert_eq!(config.server_info.name(), "Shopify MCP Server");
            Ok(())
        });
    }

    #[test]
    fn nested_fields_are_read_from_prefixed_variables() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHOPIFY_MCP_SHOPIFY__DOMAIN", "acme.myshopify.com");
            jail.set_env("SHOPIFY_MCP_SHOPIFY__API_VERSION", "2025-04");
            jail.set_env("SHOPIFY_MCP_LOGGING__LEVEL", "debug");

            let config = read_config_from_env()?;

            assert_eq!(config.shopify.domain().unwrap(), "acme.myshopify.com");
            assert_eq!(config.shopify.api_version(), "2025-04");
            assert_eq!(config.logging.level, Level::DEBUG);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_is_read_with_env_references() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STORE_TOKEN", "shpat_from_env");
            jail.create_file(
                "config.yaml",
                r#"
shopify:
  access_token: "${env.STORE_TOKEN}"
  domain: acme.myshopify.com
logging:
  level: warn
  format: json
  rotation: daily
server_info:
  title: Acme tools
"#,
            )?;

            let config = read_config("config.yaml")?;

            assert_eq!(
                config.shopify.access_token().unwrap().expose_secret(),
                "shpat_from_env"
            );
            assert_eq!(config.logging.level, Level::WARN);
            assert_eq!(config.logging.format, FormatStyle::Json);
            assert_eq!(config.logging.rotation, LogRotationKind::Daily);
            assert_eq!(config.server_info.title().as_deref(), Some("Acme tools"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win_over_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SHOPIFY_MCP_SHOPIFY__DOMAIN", "env.myshopify.com");
            jail.create_file("config.yaml", "shopify:\n  domain: file.myshopify.com\n")?;

            let config = read_config("config.yaml")?;

            assert_eq!(config.shopify.domain().unwrap(), "env.myshopify.com");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        figment::Jail::expect_with(|_| {
            let error = read_config("absent.yaml").unwrap_err();

            assert!(error.to_string().contains("absent.yaml"), "{error}");
            Ok(())
        });
    }

    #[test]
    fn undefined_reference_is_an_error() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "shopify:\n  access_token: \"${env.UNSET_SHOPIFY_TOKEN}\"\n",
            )?;

            let error = read_config("config.yaml").unwrap_err();

            assert!(error.to_string().contains("UNSET_SHOPIFY_TOKEN"), "{error}");
            Ok(())
        });
    }
}
