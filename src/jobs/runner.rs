use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{JobError, Result},
    jobs::pipeline::{JobOutcome, RenderJob, RenderPipeline},
};

/// Lifecycle of a job as seen from the outside
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Queued,
    Rendering { frame: u64, total: u64, percent: f64 },
    Finished { output: PathBuf },
    Failed { message: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Failed { .. } | Self::Cancelled)
    }
}

/// Shared flag a caller sets to stop a job between frames
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs one render job at a time on a blocking worker thread.
///
/// A second [`spawn`](Self::spawn) while a job is in flight is refused with
/// [`JobError::Busy`]; the flag clears as soon as the worker returns.
#[derive(Clone)]
pub struct JobRunner {
    pipeline: Arc<RenderPipeline>,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the worker exits, however it exits
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl JobRunner {
    pub fn new(config: Config) -> Self {
        Self {
            pipeline: Arc::new(RenderPipeline::new(config)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start `job` in the background. Must be called from within a Tokio
    /// runtime.
    pub fn spawn(&self, job: RenderJob) -> Result<JobHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(JobError::Busy.into());
        }
        let guard = BusyGuard(self.busy.clone());

        let (status_tx, status_rx) = watch::channel(JobStatus::Queued);
        let cancel = CancelFlag::new();
        let pipeline = self.pipeline.clone();
        let worker_cancel = cancel.clone();

        debug!("Spawning render worker for {:?}", job.input);
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            run_job(&pipeline, &job, &status_tx, &worker_cancel)
        });

        Ok(JobHandle {
            status: status_rx,
            cancel,
            task,
        })
    }
}

fn run_job(
    pipeline: &RenderPipeline,
    job: &RenderJob,
    status: &watch::Sender<JobStatus>,
    cancel: &CancelFlag,
) -> Result<JobOutcome> {
    let result = pipeline.render_with_progress(job, |progress| {
        status.send_replace(JobStatus::Rendering {
            frame: progress.frame_index + 1,
            total: progress.total_frames,
            percent: progress.percent(),
        });

        if cancel.is_cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    let final_status = match &result {
        Ok(outcome) => JobStatus::Finished {
            output: outcome.output.clone(),
        },
        Err(e) if e.is_cancelled() => JobStatus::Cancelled,
        Err(e) => {
            warn!("Job for {:?} failed: {}", job.input, e);
            JobStatus::Failed {
                message: e.user_message(),
            }
        }
    };
    info!("Job for {:?} ended: {:?}", job.input, final_status);
    status.send_replace(final_status);

    result
}

/// Handle to a running job
pub struct JobHandle {
    status: watch::Receiver<JobStatus>,
    cancel: CancelFlag,
    task: JoinHandle<Result<JobOutcome>>,
}

impl JobHandle {
    /// Ask the job to stop before its next frame
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A flag that cancels this job, for use from another task
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Latest published status
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Receiver that wakes on every status change
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.clone()
    }

    /// Wait for the job to end and return its result
    pub async fn wait(self) -> Result<JobOutcome> {
        self.task.await.map_err(|e| JobError::WorkerFailed {
            reason: e.to_string(),
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use crate::effects::Effect;
    use crate::error::MotionError;
    use crate::video::Frame;
    use tempfile::tempdir;

    fn runner() -> JobRunner {
        let mut config = Config::default();
        config.output.sink = SinkKind::Png;
        config.render.threads = 1;
        JobRunner::new(config)
    }

    fn job_in(dir: &std::path::Path, duration: f64, fps: u32) -> RenderJob {
        let input = dir.join("still.png");
        Frame::new_filled(48, 32, [120, 80, 40]).save_png(&input).unwrap();
        RenderJob {
            input,
            output: dir.join("frames"),
            effect: Effect::KenBurns,
            duration,
            fps,
        }
    }

    #[tokio::test]
    async fn test_job_runs_to_completion() {
        let dir = tempdir().unwrap();
        let runner = runner();
        let handle = runner.spawn(job_in(dir.path(), 1.0, 5)).unwrap();
        let mut status = handle.subscribe();

        let outcome = handle.wait().await.unwrap();
        assert_eq!(outcome.summary.frames_written, 5);
        assert_eq!(
            *status.borrow_and_update(),
            JobStatus::Finished {
                output: dir.path().join("frames")
            }
        );
        assert!(!runner.is_busy());
    }

    #[tokio::test]
    async fn test_second_job_is_refused_while_busy() {
        let dir = tempdir().unwrap();
        let runner = runner();
        let handle = runner.spawn(job_in(dir.path(), 600.0, 30)).unwrap();

        let second = runner.spawn(job_in(dir.path(), 1.0, 5));
        assert!(matches!(second, Err(MotionError::Job(JobError::Busy))));

        handle.cancel();
        let err = handle.wait().await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(!runner.is_busy());

        // Free again once the first job has stopped
        let third = runner.spawn(job_in(dir.path(), 1.0, 5)).unwrap();
        third.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_mid_render() {
        let dir = tempdir().unwrap();
        let runner = runner();
        let handle = runner.spawn(job_in(dir.path(), 600.0, 30)).unwrap();
        let mut status = handle.subscribe();

        // Wait for the first frame, then stop
        status
            .wait_for(|s| matches!(s, JobStatus::Rendering { .. }))
            .await
            .unwrap();
        handle.cancel_flag().cancel();

        let err = handle.wait().await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(*status.borrow(), JobStatus::Cancelled);
        assert!(!dir.path().join("frames/frame_000000.png").exists());
    }

    #[tokio::test]
    async fn test_failed_job_publishes_message() {
        let dir = tempdir().unwrap();
        let runner = runner();
        let job = RenderJob {
            input: dir.path().join("missing.png"),
            output: dir.path().join("frames"),
            effect: Effect::FadeIn,
            duration: 1.0,
            fps: 5,
        };
        let handle = runner.spawn(job).unwrap();
        let status = handle.subscribe();

        assert!(handle.wait().await.is_err());
        let last = status.borrow().clone();
        assert!(matches!(last, JobStatus::Failed { ref message } if message.contains("missing.png")));
        assert!(last.is_terminal());
    }
}
