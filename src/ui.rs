//! Interface de terminal do voxpoll — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`PollProgress`] acompanha visualmente cada
//! consulta de status enquanto o poller aguarda o job.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::poller::{AttemptStatus, PollAttempt, PollOutcome};
use crate::transcription::StatusReport;

/// Indicador visual de progresso para a espera de um job no terminal.
pub struct PollProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Total de tentativas permitidas, exibido como "n/max".
    max_attempts: u32,
    green: Style,
    red: Style,
    yellow: Style,
}

impl PollProgress {
    /// Inicia o spinner com um rótulo (arquivo ou id do job).
    pub fn start(label: &str, max_attempts: u32) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .expect("invalid template"),
        );
        pb.set_message(format!("waiting: {label}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            max_attempts,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza o spinner após uma consulta. Erros transitórios ganham
    /// uma linha própria em amarelo.
    pub fn attempt(&self, attempt: &PollAttempt) {
        if let AttemptStatus::TransientError(msg) = &attempt.status {
            self.pb.println(format!(
                "  {} Check {}/{} failed: {msg}",
                self.yellow.apply_to("↻"),
                attempt.attempt_number,
                self.max_attempts
            ));
        }
        self.pb.set_message(format!(
            "check {}/{}: {}",
            attempt.attempt_number, self.max_attempts, attempt.status
        ));
    }

    /// Finaliza o spinner e exibe o resultado final.
    ///
    /// Conclusão em verde, falha em vermelho, timeout em amarelo com sugestão
    /// de tentar novamente.
    pub fn complete(&self, outcome: &PollOutcome) {
        self.pb.finish_and_clear();
        match outcome {
            PollOutcome::Completed { payload } => {
                println!("  {} Transcription completed", self.green.apply_to("✓"));
                if let Some(payload) = payload {
                    println!("{}", render_payload(payload));
                }
            }
            PollOutcome::Failed { reason } => {
                println!("  {} Transcription failed: {reason}", self.red.apply_to("✗"));
            }
            PollOutcome::TimedOut => {
                println!(
                    "  {} Gave up after {} checks; the job may still finish, try `voxpoll wait` later",
                    self.yellow.apply_to("⧗"),
                    self.max_attempts
                );
            }
        }
    }

    /// Remove o spinner sem imprimir resultado (ex.: Ctrl-C).
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

/// Imprime o resultado no formato JSON voltado ao chamador.
pub fn print_json(outcome: &PollOutcome) {
    println!(
        "{}",
        serde_json::to_string_pretty(outcome).unwrap_or_default()
    );
}

/// Imprime o resultado de uma consulta avulsa de status.
pub fn print_status(job_id: &str, report: &StatusReport, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        return;
    }
    println!("{job_id}: {}", report.status);
    if let Some(reason) = &report.reason {
        println!("  reason: {reason}");
    }
    if let Some(payload) = &report.payload {
        println!("{}", render_payload(payload));
    }
}

/// Mostra o campo `text` quando existir; senão o payload inteiro em JSON.
fn render_payload(payload: &serde_json::Value) -> String {
    match payload.get("text").and_then(|t| t.as_str()) {
        Some(text) => text.to_string(),
        None => serde_json::to_string_pretty(payload).unwrap_or_default(),
    }
}
