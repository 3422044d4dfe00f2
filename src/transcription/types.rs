//! Tipos de dados para as respostas do provedor de transcrição.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme os endpoints de submissão e de status de jobs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Estado de um job de transcrição no provedor.
///
/// Serializado em minúsculas: `queued`, `processing`, `completed`, `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Resposta do endpoint de status `GET /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Estado atual do job.
    pub status: JobStatus,
    /// Resultado da transcrição; presente apenas quando `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Motivo da falha; normalmente presente apenas quando `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Resposta do endpoint de submissão `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identificador opaco do job criado.
    pub job_id: String,
}
