use thiserror::Error;

/// Falha ao buscar ou interpretar os dados da API de quedas.
///
/// Não é fatal: o ciclo é descartado e o cache anterior continua valendo.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("falha na requisição HTTP: {0}")]
    Http(String),
    #[error("API respondeu com status {0}")]
    Status(u16),
    #[error("resposta inválida da API: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// Falha ao gravar o snapshot em disco. Logada e ignorada.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("erro de I/O ao gravar snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("erro ao serializar snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Falha ao ler o snapshot na inicialização; tratada como "sem baseline".
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("erro de I/O ao ler snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot corrompido: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("data de reset inválida: {0:?}")]
    Date(String),
}

/// Configuração ausente ou inválida. Fatal antes de abrir a porta.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("erro ao carregar configuração: {0}")]
    Load(#[from] config::ConfigError),
    #[error("{0}")]
    Invalid(String),
}
