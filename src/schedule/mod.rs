//! Job scheduling: single, batch and daemon execution of crawl jobs

mod runner;

pub use runner::{JobOutcome, JobReport, RunMode, ScheduleReport, ScheduleRunner};
