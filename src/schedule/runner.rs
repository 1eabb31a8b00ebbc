//! Schedule runner
//!
//! Runs crawl jobs one after another, once or on a fixed interval. Every job
//! gets its own `CrawlRun` and therefore its own state; nothing carries over
//! between jobs or daemon iterations.

use crate::config::{CrawlJob, CrawlerConfig, OutputKind};
use crate::crawler::{CrawlOutcome, CrawlRun, Fetcher, TerminationReason};
use crate::output::{Materialized, OutputMaterializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How the configured jobs are executed
#[derive(Debug, Clone)]
pub enum RunMode {
    /// One job, once
    Single(CrawlJob),

    /// Several jobs, once, in order
    Batch(Vec<CrawlJob>),

    /// The job list repeated every `interval` until shutdown
    Daemon {
        jobs: Vec<CrawlJob>,
        interval: Duration,
        /// Stop after this many passes over the job list
        max_iterations: Option<u32>,
    },
}

/// How one job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The crawl completed and its output was materialized
    Materialized(Materialized),

    /// Robots policy forbade the crawl
    PolicyTerminated(TerminationReason),

    /// The crawl or its output failed
    Failed(String),
}

/// Result of one job within a schedule
#[derive(Debug, Clone)]
pub struct JobReport {
    /// 1-based pass over the job list
    pub iteration: u32,
    pub site: String,
    pub output_kind: OutputKind,
    pub destination: PathBuf,
    pub outcome: JobOutcome,
}

/// Summary of a whole schedule
///
/// Only the most recent pass keeps per-job reports; earlier daemon passes
/// survive as counters.
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    /// Completed passes over the job list
    pub iterations: u32,
    /// Reports from the latest pass
    pub jobs: Vec<JobReport>,
    jobs_run: usize,
    failures: usize,
}

impl ScheduleReport {
    /// Number of jobs that failed across every pass
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Number of jobs run across every pass
    pub fn jobs_run(&self) -> usize {
        self.jobs_run
    }

    fn record(&mut self, job: JobReport) {
        match &job.outcome {
            JobOutcome::Materialized(materialized) => tracing::info!(
                "[{}] {} -> {}: {:?}",
                job.iteration,
                job.site,
                job.destination.display(),
                materialized
            ),
            JobOutcome::PolicyTerminated(reason) => {
                tracing::info!("[{}] {} skipped: {:?}", job.iteration, job.site, reason)
            }
            JobOutcome::Failed(_) => self.failures += 1,
        }
        self.jobs_run += 1;
        self.jobs.push(job);
    }
}

/// Executes crawl jobs according to a [`RunMode`]
pub struct ScheduleRunner {
    fetcher: Arc<dyn Fetcher>,
    materializer: OutputMaterializer,
    config: CrawlerConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ScheduleRunner {
    pub fn new(fetcher: Arc<dyn Fetcher>, materializer: OutputMaterializer, config: CrawlerConfig) -> Self {
        Self {
            fetcher,
            materializer,
            config,
            shutdown: None,
        }
    }

    /// Stops daemon mode once `true` is sent on the channel
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Runs the schedule to completion
    ///
    /// Job failures are logged and reported; they never stop the schedule.
    pub async fn run(&mut self, mode: RunMode) -> ScheduleReport {
        let mut report = ScheduleReport::default();

        match mode {
            RunMode::Single(job) => {
                self.run_iteration(std::slice::from_ref(&job), &mut report).await;
            }
            RunMode::Batch(jobs) => {
                self.run_iteration(&jobs, &mut report).await;
            }
            RunMode::Daemon {
                jobs,
                interval,
                max_iterations,
            } => {
                tracing::info!(
                    "Daemon mode: {} jobs every {}s",
                    jobs.len(),
                    interval.as_secs()
                );
                loop {
                    self.run_iteration(&jobs, &mut report).await;

                    if max_iterations.is_some_and(|max| report.iterations >= max) {
                        tracing::info!("Reached {} iterations, stopping", report.iterations);
                        break;
                    }

                    tracing::info!("Next pass in {}s", interval.as_secs());
                    if self.sleep_or_shutdown(interval).await {
                        tracing::info!("Shutdown requested, stopping daemon");
                        break;
                    }
                }
            }
        }

        report
    }

    async fn run_iteration(&self, jobs: &[CrawlJob], report: &mut ScheduleReport) {
        report.iterations += 1;
        report.jobs.clear();
        let iteration = report.iterations;

        for job in jobs {
            let outcome = self.run_job(job).await;
            report.record(JobReport {
                iteration,
                site: job.site.clone(),
                output_kind: job.output_kind,
                destination: job.destination.clone(),
                outcome,
            });
        }
    }

    /// Crawls one site and materializes its output
    pub async fn run_job(&self, job: &CrawlJob) -> JobOutcome {
        tracing::info!(
            "Job {} -> {} ({})",
            job.site,
            job.destination.display(),
            job.output_kind
        );

        let mut run = match CrawlRun::new(self.fetcher.clone(), self.config.clone(), &job.site) {
            Ok(run) => run,
            Err(e) => {
                tracing::error!("Cannot crawl {}: {}", job.site, e);
                return JobOutcome::Failed(e.to_string());
            }
        };

        let state = match run.execute().await {
            Ok(CrawlOutcome::Completed(state)) => state,
            Ok(CrawlOutcome::PolicyTerminated { reason, .. }) => {
                return JobOutcome::PolicyTerminated(reason);
            }
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", job.site, e);
                return JobOutcome::Failed(e.to_string());
            }
        };

        match self
            .materializer
            .materialize(&state, job.output_kind, &job.destination)
        {
            Ok(materialized) => JobOutcome::Materialized(materialized),
            Err(e) => {
                tracing::error!("Writing {} failed: {}", job.destination.display(), e);
                JobOutcome::Failed(e.to_string())
            }
        }
    }

    /// Sleeps for `duration`; returns true if shutdown was requested instead
    async fn sleep_or_shutdown(&mut self, duration: Duration) -> bool {
        let Some(shutdown) = self.shutdown.as_mut() else {
            tokio::time::sleep(duration).await;
            return false;
        };

        if *shutdown.borrow() {
            return true;
        }

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone; nobody can ask us to stop any more
                        (&mut sleep).await;
                        return false;
                    }
                    if *shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}
