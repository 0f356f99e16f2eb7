//! Periodic process memory logging.

use log::{debug, info, warn};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

/// Memory usage of the current process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// Read the current process memory usage.
pub fn sample_memory(sys: &mut System, pid: Pid) -> Option<MemorySample> {
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid).map(|process| MemorySample {
        resident_bytes: process.memory(),
        virtual_bytes: process.virtual_memory(),
    })
}

fn megabytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

/// Background task that logs memory usage at a fixed interval.
pub struct MemoryMonitor {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MemoryMonitor {
    /// Spawn the monitor; the first sample is taken one interval from now.
    pub fn start(interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let pid = match sysinfo::get_current_pid() {
                Ok(pid) => pid,
                Err(err) => {
                    warn!("memory monitor disabled (reason={})", err);
                    return;
                }
            };
            let mut sys = System::new();
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            info!("memory monitor started (interval_secs={})", interval.as_secs());
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Some(sample) = sample_memory(&mut sys, pid) {
                            info!(
                                "memory usage (rss_mb={}, virtual_mb={})",
                                megabytes(sample.resident_bytes),
                                megabytes(sample.virtual_bytes)
                            );
                        }
                    }
                }
            }
            debug!("memory monitor stopped");
        });
        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Stop the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(err) = self.handle.await {
            warn!("memory monitor task failed (error={})", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_current_process() {
        let pid = sysinfo::get_current_pid().expect("pid");
        let mut sys = System::new();
        let sample = sample_memory(&mut sys, pid).expect("sample");
        assert!(sample.resident_bytes > 0);
    }

    #[tokio::test]
    async fn monitor_stops_promptly() {
        let monitor = MemoryMonitor::start(Duration::from_secs(3600));
        time::timeout(Duration::from_secs(5), monitor.stop())
            .await
            .expect("monitor stopped");
    }
}
