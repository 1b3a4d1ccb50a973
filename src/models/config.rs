//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FieldDefinition, TraversalRule, TypeHint};

/// Placeholder replaced by the identifier in endpoint templates.
pub const RIP_PLACEHOLDER: &str = "{rip}";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Registry endpoints and page readiness settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Field catalog
    #[serde(default = "defaults::default_fields")]
    pub fields: Vec<FieldDefinition>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.session.user_agent.trim().is_empty() {
            return Err(AppError::validation("session.user_agent is empty"));
        }
        if self.session.request_timeout_secs == 0 {
            return Err(AppError::validation(
                "session.request_timeout_secs must be > 0",
            ));
        }
        if self.registry.wait_timeout_secs == 0 {
            return Err(AppError::validation("registry.wait_timeout_secs must be > 0"));
        }
        if self.registry.frame_name.trim().is_empty() {
            return Err(AppError::validation("registry.frame_name is empty"));
        }
        url::Url::parse(&self.registry.root_url)
            .map_err(|e| AppError::validation(format!("registry.root_url: {e}")))?;
        for (key, template) in [
            ("registry.utilization_url", &self.registry.utilization_url),
            ("registry.property_url", &self.registry.property_url),
        ] {
            if !template.contains(RIP_PLACEHOLDER) {
                return Err(AppError::validation(format!(
                    "{key} must contain the {RIP_PLACEHOLDER} placeholder"
                )));
            }
        }
        if self.output.file_pattern.trim().is_empty() {
            return Err(AppError::validation("output.file_pattern is empty"));
        }
        if self.fields.is_empty() {
            return Err(AppError::validation("No fields defined"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(AppError::validation("Field with empty name"));
            }
            if field.anchor_label.is_empty() {
                return Err(AppError::validation(format!(
                    "Field '{}' has an empty anchor label",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            registry: RegistryConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            fields: defaults::default_fields(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Hard limit for login requests, in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

/// Registry endpoints and readiness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Application root (login frameset)
    #[serde(default = "defaults::root_url")]
    pub root_url: String,

    /// Primary endpoint template, the utilization view
    #[serde(default = "defaults::utilization_url")]
    pub utilization_url: String,

    /// Fallback endpoint template, the property view
    #[serde(default = "defaults::property_url")]
    pub property_url: String,

    /// Frame holding the application content when served from the root
    #[serde(default = "defaults::frame_name")]
    pub frame_name: String,

    /// Page readiness timeout in seconds
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_secs: u64,
}

impl RegistryConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_url: defaults::root_url(),
            utilization_url: defaults::utilization_url(),
            property_url: defaults::property_url(),
            frame_name: defaults::frame_name(),
            wait_timeout_secs: defaults::wait_timeout(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for result files
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// File name pattern; `{timestamp}` becomes the run start time
    #[serde(default = "defaults::file_pattern")]
    pub file_pattern: String,

    /// Keep the leading `R$` on extracted values
    #[serde(default)]
    pub keep_currency_symbol: bool,
}

impl OutputConfig {
    /// Result file path for a run started at `started_at`.
    pub fn result_path(&self, started_at: &DateTime<Local>) -> PathBuf {
        let name = self.file_pattern.replace(
            "{timestamp}",
            &started_at.format("%Y%m%d-%H%M%S").to_string(),
        );
        Path::new(&self.dir).join(name)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            file_pattern: defaults::file_pattern(),
            keep_currency_symbol: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// File that mirrors every status line
    #[serde(default)]
    pub mirror_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            mirror_file: None,
        }
    }
}

mod defaults {
    use super::{FieldDefinition, TraversalRule, TypeHint};

    // Session defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".into()
    }
    pub fn accept_language() -> String {
        "pt,en-US;q=0.9,en;q=0.8".into()
    }
    pub fn request_timeout() -> u64 {
        30
    }

    // Registry defaults
    pub fn root_url() -> String {
        "http://spiunet.spu.planejamento.gov.br/default.asp".into()
    }
    pub fn utilization_url() -> String {
        "http://spiunet.spu.planejamento.gov.br/consulta/Cons_Utilizacao.asp?NU_RIP={rip}".into()
    }
    pub fn property_url() -> String {
        "http://spiunet.spu.planejamento.gov.br/consulta/Cons_Imovel.asp?NU_RIP={rip}".into()
    }
    pub fn frame_name() -> String {
        "Principal".into()
    }
    pub fn wait_timeout() -> u64 {
        3
    }

    // Output defaults
    pub fn output_dir() -> String {
        ".".into()
    }
    pub fn file_pattern() -> String {
        "resultado{timestamp}.csv".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }

    // Field catalog defaults
    pub fn default_fields() -> Vec<FieldDefinition> {
        use TraversalRule::{Rule1, Rule2, Rule3};
        use TypeHint::{Date, Number, Text};

        let table: [(&str, &str, TraversalRule, TypeHint); 21] = [
            // Property view
            ("RIPI", "Rip:", Rule1, Text),
            ("IncorporaData", "Data da Incorporação:", Rule1, Date),
            ("Logradouro", "Logradouro:", Rule1, Text),
            ("Numero", "Número:", Rule1, Number),
            ("Natureza", "Natureza:", Rule1, Text),
            (
                "TerrenoAreaI",
                "Área\n                  Terreno (m²):",
                Rule1,
                Number,
            ),
            ("ConstruidaAreaI", "Área Construída (m²):", Rule1, Number),
            ("TerrenoValorI", "Valor do Terreno (R$):", Rule1, Number),
            (
                "BenfeitoriasValorI",
                "Valor Benfeitorias Utilizações (R$):",
                Rule1,
                Number,
            ),
            ("ImovelValor", "Valor do Imóvel (R$):", Rule1, Number),
            // Utilization view
            ("RIPU", "RIP Utilização:", Rule1, Text),
            ("UGcod", "Código UG/Gestão:", Rule2, Text),
            ("DestTipo", "Tipo de Destinação:", Rule2, Text),
            ("DestDesc", "Descrição da Destinação:", Rule1, Text),
            ("TerrenoAreaU", "Área Terreno Utilizada (m²):", Rule1, Number),
            ("ConstruidaAreaU", "Área Construída (m²):", Rule3, Number),
            ("Tipo", "Tipo do Imóvel:", Rule1, Text),
            ("AvaliacaoDataU", "Data Avaliação:", Rule1, Date),
            ("TerrenoValorU", "Valor do Terreno (R$):", Rule1, Number),
            ("BenfeitoriasValorU", "Valor da Benfeitoria (R$):", Rule1, Number),
            ("UtilizacaoValor", "Valor da Utilização (R$):", Rule1, Number),
        ];

        table
            .into_iter()
            .map(|(name, label, rule, hint)| FieldDefinition::new(name, label, rule, hint))
            .collect()
    }
}
