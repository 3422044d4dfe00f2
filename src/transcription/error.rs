//! Tipos de erro para o cliente do provedor de transcrição.
//!
//! Define [`TranscriptionError`] com variantes para rate limiting, erros da API,
//! erros de rede e respostas malformadas. Para o poller, qualquer uma delas
//! numa consulta de status é uma falha transitória.

use thiserror::Error;

/// Erros que podem ocorrer ao interagir com o provedor de transcrição.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// O servidor retornou HTTP 429 (rate limit).
    /// O campo `retry_after_ms` indica quantos milissegundos esperar antes de retentar.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Qualquer outro status HTTP fora da faixa 2xx.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Resposta 2xx cujo corpo não corresponde ao formato esperado.
    #[error("failed to parse provider response: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = TranscriptionError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
    }

    #[test]
    fn api_error_display() {
        let err = TranscriptionError::ApiError {
            status: 401,
            message: "invalid api key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): invalid api key");
    }

    #[test]
    fn parse_error_display() {
        let err = TranscriptionError::ParseError("missing field `status`".into());
        assert_eq!(
            err.to_string(),
            "failed to parse provider response: missing field `status`"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TranscriptionError>();
    }
}
