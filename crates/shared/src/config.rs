//! Application configuration management.
//!
//! Replaces the host platform's ambient option reads with an explicit
//! configuration struct injected into the services that need it.

use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Fiscal provider (OFD) configuration.
    pub fiscal: FiscalConfig,
    /// Receipt-related options.
    pub receipt: ReceiptConfig,
}

/// Fiscal provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FiscalConfig {
    /// Base URL for rendered receipt documents.
    #[serde(default = "default_html_url")]
    pub html_url: String,
    /// Path prefix inserted between the base URL and the cashbox identifiers.
    #[serde(default = "default_html_prefix")]
    pub html_prefix: String,
    /// Seconds to wait between creating a receipt and polling its info.
    /// The provider is eventually consistent.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

fn default_html_url() -> String {
    "https://check.ofd.example/".to_string()
}

fn default_html_prefix() -> String {
    "rec".to_string()
}

fn default_settle_delay_secs() -> u64 {
    2
}

/// Receipt-related options.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    /// Service email printed on service-fee receipts.
    #[serde(default = "default_service_email")]
    pub service_email: String,
}

fn default_service_email() -> String {
    "receipts@farebox.example".to_string()
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FAREBOX").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Settle delay as a `Duration`.
    #[must_use]
    pub const fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fiscal.settle_delay_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fiscal: FiscalConfig {
                html_url: default_html_url(),
                html_prefix: default_html_prefix(),
                settle_delay_secs: default_settle_delay_secs(),
            },
            receipt: ReceiptConfig {
                service_email: default_service_email(),
            },
        }
    }
}
