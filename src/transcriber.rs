use std::path::Path;

use tracing::info;

use crate::error::VoxpollError;
use crate::poller::{BackoffPolicy, PollAttempt, PollJob, PollOutcome, Poller};
use crate::transcription::{JobSubmitter, StatusChecker};

/// Drives the upload-audio flow: submit, then await the job with the poller.
pub struct Transcriber<C> {
    client: C,
    poller: Poller,
}

impl<C> Transcriber<C> {
    pub fn new(client: C, policy: BackoffPolicy) -> Self {
        Self {
            client,
            poller: Poller::new(policy),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn policy(&self) -> &BackoffPolicy {
        self.poller.policy()
    }
}

impl<C: StatusChecker> Transcriber<C> {
    /// Await a job that was submitted elsewhere.
    pub async fn await_job(
        &self,
        job_id: &str,
        on_attempt: impl FnMut(&PollAttempt),
    ) -> PollOutcome {
        let job = PollJob::new(job_id);
        self.poll(&job, on_attempt).await
    }

    async fn poll(&self, job: &PollJob, on_attempt: impl FnMut(&PollAttempt)) -> PollOutcome {
        let policy = self.poller.policy();
        info!(
            job_id = job.job_id(),
            max_attempts = policy.max_attempts,
            worst_case_secs = policy.worst_case_wait().as_secs(),
            "awaiting transcription"
        );
        self.poller.poll_observed(job, &self.client, on_attempt).await
    }
}

impl<C: StatusChecker + JobSubmitter> Transcriber<C> {
    /// Submit an audio file and await its transcription.
    ///
    /// Errors cover only what happens before a job exists (reading the file,
    /// submission). Once submitted, every path ends in a [`PollOutcome`].
    pub async fn transcribe_file(
        &self,
        path: &Path,
        on_attempt: impl FnMut(&PollAttempt),
    ) -> Result<PollOutcome, VoxpollError> {
        let audio = tokio::fs::read(path).await?;
        if audio.is_empty() {
            return Err(VoxpollError::EmptyAudio(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio");
        let bytes = audio.len();
        let job_id = self.client.submit_audio(audio, file_name).await?;
        let job = PollJob::new(job_id);
        info!(job_id = job.job_id(), file_name, bytes, "audio submitted");

        Ok(self.poll(&job, on_attempt).await)
    }
}
