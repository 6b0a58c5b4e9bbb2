#[cfg(feature = "monitor")]
use std::sync::Mutex;
#[cfg(feature = "monitor")]
use std::time::{Duration, Instant};
#[cfg(feature = "monitor")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Resource usage sampled at the end of one scrape phase.
#[cfg(feature = "monitor")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_usage: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub phase_time: Duration,
    pub total_time: Duration,
}

#[cfg(feature = "monitor")]
struct Tracker {
    system: System,
    phase_started: Instant,
    peak_rss_mb: u64,
}

/// Samples the service process between scrape phases.
///
/// Chromium runs as a child process, so the numbers cover the service
/// itself rather than the browser.
#[cfg(feature = "monitor")]
pub struct SystemMonitor {
    pid: Option<Pid>,
    started: Instant,
    tracker: Option<Mutex<Tracker>>,
}

#[cfg(feature = "monitor")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let started = Instant::now();
        if !enabled {
            return Self {
                pid: None,
                started,
                tracker: None,
            };
        }

        let pid = sysinfo::get_current_pid()
            .map_err(|e| tracing::warn!("Monitoring disabled, cannot resolve own PID: {}", e))
            .ok();

        let tracker = pid.map(|pid| {
            let mut system = System::new();
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            Mutex::new(Tracker {
                system,
                phase_started: started,
                peak_rss_mb: 0,
            })
        });

        Self {
            pid,
            started,
            tracker,
        }
    }

    /// Samples the process and starts timing the next phase.
    pub fn sample(&self) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut tracker = self.tracker.as_ref()?.lock().ok()?;

        tracker
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let (cpu_usage, rss_mb) = {
            let process = tracker.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };

        tracker.peak_rss_mb = tracker.peak_rss_mb.max(rss_mb);
        let phase_time = tracker.phase_started.elapsed();
        tracker.phase_started = Instant::now();

        Some(PhaseStats {
            cpu_usage,
            rss_mb,
            peak_rss_mb: tracker.peak_rss_mb,
            phase_time,
            total_time: self.started.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} took {:?} - CPU: {:.1}%, RSS: {}MB (peak {}MB)",
                phase,
                stats.phase_time,
                stats.cpu_usage,
                stats.rss_mb,
                stats.peak_rss_mb
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 Scrape total {:?}, peak RSS {}MB",
                stats.total_time,
                stats.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tracker.is_some()
    }
}

// No-op stand-in when built without the `monitor` feature
#[cfg(not(feature = "monitor"))]
pub struct SystemMonitor;

#[cfg(not(feature = "monitor"))]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            tracing::warn!("Built without the `monitor` feature, resource stats unavailable");
        }
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
