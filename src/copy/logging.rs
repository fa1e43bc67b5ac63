//! Structured logging with correlation tracking for copy runs
//!
//! Every run gets a correlation id; each event is logged as one JSON object
//! so a run can be followed step by step in the log.

use super::error::{CopyError, SkippedStep};
use super::step::CopyStep;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Monitoring and logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub correlation_ids: bool,
    #[serde(default = "default_true")]
    pub step_logging: bool,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            correlation_ids: true,
            step_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

impl MonitoringConfig {
    /// Only failures are logged
    pub fn quiet() -> Self {
        Self {
            correlation_ids: false,
            step_logging: false,
            log_level: LogLevel::Error,
        }
    }
}

/// Counters of one copy run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyStatistics {
    pub queries_issued: usize,
    pub steps_executed: usize,
    pub steps_skipped: usize,
    pub rows_received: usize,
    pub records_built: usize,
}

/// Context of a single copy run
#[derive(Debug, Clone)]
pub struct CopyContext {
    pub correlation_id: String,
    pub filter_name: String,
    pub start_time: Instant,
}

impl CopyContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CopyLogger {
    config: MonitoringConfig,
}

impl CopyLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    pub fn start_copy(&self, filter_name: &str, source: &str, mode: &str) -> CopyContext {
        let correlation_id = if self.config.correlation_ids {
            uuid::Uuid::new_v4().to_string()
        } else {
            String::new()
        };
        let context = CopyContext {
            correlation_id,
            filter_name: filter_name.to_string(),
            start_time: Instant::now(),
        };

        if self.should_log(LogLevel::Info) {
            let log_data = json!({
                "event": "copy_started",
                "correlation_id": context.correlation_id,
                "filter": context.filter_name,
                "source": source,
                "mode": mode,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            info!("Record Copy Started: {}", log_data);
        }

        context
    }

    pub fn step_started(&self, context: &CopyContext, step: &CopyStep, queue_len: usize) {
        if !self.config.step_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "step_started",
            "correlation_id": context.correlation_id,
            "info_area": step.info_area_id(),
            "source": step.source_record_identification.as_str(),
            "link_id": step.query_table.link_id,
            "config": step.fetch_config.describe(),
            "queued": queue_len,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("Copy Step Started: {}", log_data);
    }

    pub fn step_skipped(&self, context: &CopyContext, skipped: &SkippedStep) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let log_data = json!({
            "event": "step_skipped",
            "correlation_id": context.correlation_id,
            "info_area": skipped.info_area_id,
            "source": skipped.source_record.as_str(),
            "reason": skipped.reason,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("Copy Step Skipped: {}", log_data);
    }

    pub fn step_completed(
        &self,
        context: &CopyContext,
        step: &CopyStep,
        rows: usize,
        child_steps: usize,
        duration: Duration,
    ) {
        if !self.config.step_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "step_completed",
            "correlation_id": context.correlation_id,
            "info_area": step.info_area_id(),
            "source": step.source_record_identification.as_str(),
            "rows": rows,
            "child_steps": child_steps,
            "duration_ms": duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("Copy Step Completed: {}", log_data);
    }

    pub fn copy_finished(&self, context: &CopyContext, statistics: &CopyStatistics) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let log_data = json!({
            "event": "copy_finished",
            "correlation_id": context.correlation_id,
            "filter": context.filter_name,
            "statistics": statistics,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        info!("Record Copy Finished: {}", log_data);
    }

    pub fn copy_failed(&self, context: &CopyContext, failure: &CopyError, statistics: &CopyStatistics) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let log_data = json!({
            "event": "copy_failed",
            "correlation_id": context.correlation_id,
            "filter": context.filter_name,
            "error": failure.to_string(),
            "statistics": statistics,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        error!("Record Copy Failed: {}", log_data);
    }

    fn should_log(&self, level: LogLevel) -> bool {
        match (self.config.log_level, level) {
            (LogLevel::Error, LogLevel::Error) => true,
            (LogLevel::Warn, LogLevel::Error | LogLevel::Warn) => true,
            (LogLevel::Info, LogLevel::Error | LogLevel::Warn | LogLevel::Info) => true,
            (LogLevel::Debug, LogLevel::Error | LogLevel::Warn | LogLevel::Info | LogLevel::Debug) => true,
            (LogLevel::Trace, _) => true,
            _ => false,
        }
    }
}
