use crate::error::ConfigError;
use crate::source::DEFAULT_UPSTREAM_URL;
use chrono_tz::Tz;
use config as config_crate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuração operacional do serviço.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chave da API do Google Maps embutida na página (obrigatória).
    pub google_maps_api_key: String,
    /// Porta HTTP.
    pub port: u16,
    /// Intervalo entre coletas em segundos.
    pub poll_interval_secs: u64,
    /// Timeout da requisição à API de quedas.
    pub fetch_timeout_secs: u64,
    pub upstream_url: String,
    /// Arquivo do snapshot do baseline.
    pub state_file: PathBuf,
    /// Fuso que define o "dia" do baseline.
    pub timezone: String,
    /// Diretório dos arquivos estáticos do cliente.
    pub public_dir: PathBuf,
}

impl Config {
    /// Lê `config.*` (opcional) e depois as variáveis de ambiente.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config_crate::Config::builder()
            .add_source(config_crate::File::with_name("config").required(false))
            .add_source(config_crate::Environment::default().try_parsing(true));
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config_crate::ConfigBuilder<config_crate::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("port", 3000)?
            .set_default("poll_interval_secs", 300)?
            .set_default("fetch_timeout_secs", 30)?
            .set_default("upstream_url", DEFAULT_UPSTREAM_URL)?
            .set_default("state_file", "outage_state.json")?
            .set_default("timezone", "America/Los_Angeles")?
            .set_default("public_dir", "public")?
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.google_maps_api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "GOOGLE_MAPS_API_KEY não pode ser vazia".into(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs deve ser maior que zero".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs deve ser maior que zero".into(),
            ));
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("fuso horário desconhecido: {}", self.timezone)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
