//! Configuração do voxpoll carregada a partir de `voxpoll.toml`.
//!
//! A struct [`VoxpollConfig`] contém o endpoint do provedor, a chave da API e
//! a política de backoff do poller (tabela `[poll]`). Valores não presentes no
//! arquivo usam defaults sensíveis. As variáveis de ambiente `VOXPOLL_API_KEY`
//! e `VOXPOLL_BASE_URL` têm precedência sobre o arquivo; as flags da CLI têm
//! precedência sobre ambos.

use serde::Deserialize;
use std::path::Path;

use crate::cli::Cli;
use crate::error::VoxpollError;
use crate::poller::BackoffPolicy;
use crate::transcription::client::DEFAULT_BASE_URL;

/// Configuração de nível superior carregada de `voxpoll.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoxpollConfig {
    /// Chave da API do provedor de transcrição (enviada como bearer token).
    #[serde(default)]
    pub api_key: String,

    /// URL base dos endpoints de jobs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Política de backoff e limite de tentativas.
    #[serde(default)]
    pub poll: BackoffPolicy,
}

// Valor padrão para a URL base.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for VoxpollConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            poll: BackoffPolicy::default(),
        }
    }
}

impl VoxpollConfig {
    /// Carrega a configuração de `voxpoll.toml` no diretório atual, aplicando
    /// as variáveis de ambiente por cima.
    pub fn load() -> Result<Self, VoxpollError> {
        let mut config = Self::load_from(Path::new("voxpoll.toml"))?;

        if let Ok(key) = std::env::var("VOXPOLL_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("VOXPOLL_BASE_URL")
            && !url.is_empty()
        {
            config.base_url = url;
        }

        Ok(config)
    }

    /// Carrega a configuração de um arquivo específico.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self, VoxpollError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<VoxpollConfig>(&contents)?)
    }

    /// Aplica as flags globais da CLI, que vencem o arquivo e o ambiente.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(n) = cli.max_attempts {
            self.poll.max_attempts = n;
        }
        if let Some(ms) = cli.initial_delay_ms {
            self.poll.initial_delay_ms = ms;
        }
        if let Some(ms) = cli.max_delay_ms {
            self.poll.max_delay_ms = ms;
        }
        if let Some(m) = cli.multiplier {
            self.poll.backoff_multiplier = m;
        }
    }

    /// Valida a configuração final antes de qualquer chamada ao provedor.
    pub fn validate(&self) -> Result<(), VoxpollError> {
        if self.base_url.trim().is_empty() {
            return Err(VoxpollError::Config("base_url must not be empty".into()));
        }
        self.poll.validate()
    }
}
