//! Cooperative interval scheduler.
//!
//! The scheduler notifies a [`SchedulerDelegate`] when a job is due; the
//! main loop implements the delegate to run the job.  Nothing here
//! blocks, and jobs fire in registration order within one tick.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  uptime_ms ──▶ Scheduler::tick                            │
//! │                  │                                        │
//! │                  ├─ ReceiveCommand    every  250 ms       │
//! │                  ├─ ReadMeasurements  every 1000 ms       │
//! │                  ├─ ReadStatus        every 1000 ms       │
//! │                  ├─ EvaluateLoad      every 1000 ms       │
//! │                  └─ ApplyOutputs      every 1000 ms       │
//! │                          │                                │
//! │                          ▼                                │
//! │                SchedulerDelegate::on_job_due(job)         │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! A job is due when strictly more than its interval has elapsed since
//! it last ran.  The millisecond counter is 32-bit; when it wraps
//! (`now < last_run`), `last_run` is reset to 0 so the job keeps firing.

use log::info;

use crate::app::ports::{Job, SchedulerDelegate};
use crate::config::StationConfig;

/// Maximum number of jobs (stack-allocated).
const MAX_JOBS: usize = 8;

/// A single job-table entry.
#[derive(Debug, Clone, Copy)]
struct Entry {
    job: Job,
    interval_ms: u32,
    last_run_ms: u32,
}

pub struct Scheduler {
    entries: heapless::Vec<Entry, MAX_JOBS>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// The station's job table, with intervals from `config`.
    pub fn from_config(config: &StationConfig) -> Self {
        let mut sched = Self::new();
        for job in Job::ALL {
            let interval_ms = match job {
                Job::ReceiveCommand => config.receive_interval_ms,
                Job::ReadMeasurements => config.measurement_interval_ms,
                Job::ReadStatus => config.status_interval_ms,
                Job::EvaluateLoad => config.evaluate_interval_ms,
                Job::ApplyOutputs => config.apply_interval_ms,
            };
            // Job::ALL is shorter than MAX_JOBS.
            let _ = sched.add(job, interval_ms);
        }
        sched
    }

    /// Register `job`.  Returns `false` if the table is full.
    pub fn add(&mut self, job: Job, interval_ms: u32) -> bool {
        let added = self
            .entries
            .push(Entry {
                job,
                interval_ms,
                last_run_ms: 0,
            })
            .is_ok();
        if added {
            info!("Scheduler: {:?} every {} ms", job, interval_ms);
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every due job.  Call as often as possible from the main loop.
    pub fn tick(&mut self, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for entry in &mut self.entries {
            if now_ms < entry.last_run_ms {
                // Counter wrapped.
                entry.last_run_ms = 0;
            }
            if now_ms - entry.last_run_ms > entry.interval_ms {
                entry.last_run_ms = now_ms;
                delegate.on_job_due(entry.job);
            }
        }
    }
}
