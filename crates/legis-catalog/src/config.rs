//! Catalog configuration.
//!
//! Values come from [`CatalogConfig::default`] or from `LEGIS_*` environment
//! variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LEGIS_CAMARA_URL` | `https://dadosabertos.camara.leg.br/api/v2` |
//! | `LEGIS_SENADO_URL` | `https://legis.senado.leg.br/dadosabertos` |
//! | `LEGIS_MAX_PAGES` | 20 |
//! | `LEGIS_TIMEOUT_SECS` | 30 |
//! | `LEGIS_USER_AGENT` | `legis-catalog/<version>` |

use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

use legis_core::{defaults, Chamber, Error, Result};

use crate::loader::LoaderConfig;

/// Runtime configuration for the HTTP source and loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the Câmara API.
    pub camara_base_url: String,
    /// Base URL of the Senado API.
    pub senado_base_url: String,
    /// Safety cap on pages per paginated load.
    pub max_pages: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            camara_base_url: Chamber::Camara.default_base_url().to_string(),
            senado_base_url: Chamber::Senado.default_base_url().to_string(),
            max_pages: defaults::MAX_PAGES,
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let config = Self {
            camara_base_url: env::var("LEGIS_CAMARA_URL")
                .unwrap_or_else(|_| defaults::CAMARA_URL.to_string()),
            senado_base_url: env::var("LEGIS_SENADO_URL")
                .unwrap_or_else(|_| defaults::SENADO_URL.to_string()),
            max_pages: env::var("LEGIS_MAX_PAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::MAX_PAGES),
            timeout_secs: env::var("LEGIS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::HTTP_TIMEOUT_SECS),
            user_agent: env::var("LEGIS_USER_AGENT")
                .unwrap_or_else(|_| defaults::USER_AGENT.to_string()),
        };
        debug!(
            camara = %config.camara_base_url,
            senado = %config.senado_base_url,
            max_pages = config.max_pages,
            "Catalog config loaded from environment"
        );
        config
    }

    /// Base URL serving a chamber's catalogs.
    pub fn base_url_for(&self, chamber: Chamber) -> &str {
        match chamber {
            Chamber::Camara => &self.camara_base_url,
            Chamber::Senado => &self.senado_base_url,
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            max_pages: self.max_pages,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_url("camara_base_url", &self.camara_base_url)?;
        validate_url("senado_base_url", &self.senado_base_url)?;

        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", field)));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "{} must start with http:// or https://, got: {}",
            field, url
        )));
    }

    Ok(())
}
