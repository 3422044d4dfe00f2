//! Interface de linha de comando do voxpoll baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (transcribe, wait, status)
//! e flags globais que sobrescrevem a política de backoff do arquivo de configuração.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// voxpoll — submete áudio para transcrição e aguarda o job com backoff limitado.
#[derive(Debug, Parser)]
#[command(name = "voxpoll", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Número máximo de consultas de status antes de desistir.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Atraso após a primeira consulta não concluída, em milissegundos.
    #[arg(long, global = true)]
    pub initial_delay_ms: Option<u64>,

    /// Teto para cada atraso, em milissegundos.
    #[arg(long, global = true)]
    pub max_delay_ms: Option<u64>,

    /// Fator de crescimento do atraso entre consultas.
    #[arg(long, global = true)]
    pub multiplier: Option<f64>,

    /// URL base do provedor de transcrição.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Imprime o resultado final como JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Envia um arquivo de áudio e aguarda a transcrição.
    Transcribe {
        /// Caminho do arquivo de áudio.
        file: PathBuf,
    },

    /// Aguarda um job já submetido.
    Wait {
        /// Identificador do job no provedor.
        job_id: String,
    },

    /// Consulta o status de um job uma única vez, sem polling.
    Status {
        /// Identificador do job no provedor.
        job_id: String,
    },
}
