use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::clock::Clock;
use crate::message::{models::MessageModel, repository::MessageRepository};
use crate::participant::repository::ParticipantRepository;
use crate::shared::AppError;

/// Configuration for the presence reaper
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// How often to sweep the registry
    pub sweep_interval: Duration,
    /// How long a participant may go without a heartbeat before eviction
    pub inactivity_threshold: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(15),
            inactivity_threshold: Duration::from_secs(10),
        }
    }
}

/// Outcome of a single sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Participants present when the sweep took its snapshot
    pub scanned: usize,
    /// Participants found stale in the snapshot
    pub stale: usize,
    /// Participants actually removed
    pub evicted: usize,
    /// Appends or evictions that failed and were skipped
    pub failures: usize,
}

/// Starts the background task that periodically evicts inactive participants.
/// Runs until the process shuts down.
#[instrument(skip(participants, messages, clock))]
pub async fn start_reaper_task(
    participants: Arc<dyn ParticipantRepository + Send + Sync>,
    messages: Arc<dyn MessageRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
    config: ReaperConfig,
) {
    info!(
        sweep_interval_ms = config.sweep_interval.as_millis() as u64,
        inactivity_threshold_ms = config.inactivity_threshold.as_millis() as u64,
        "Starting presence reaper background task"
    );

    let mut sweep_interval = interval_at(
        Instant::now() + config.sweep_interval,
        config.sweep_interval,
    );

    loop {
        sweep_interval.tick().await;

        // Each sweep runs in its own task so a panic is contained to that tick
        let sweep = tokio::spawn(sweep_inactive_participants(
            Arc::clone(&participants),
            Arc::clone(&messages),
            Arc::clone(&clock),
            config.inactivity_threshold,
        ));

        match sweep.await {
            Ok(Ok(report)) if report.stale > 0 || report.failures > 0 => {
                info!(
                    scanned = report.scanned,
                    stale = report.stale,
                    evicted = report.evicted,
                    failures = report.failures,
                    "Presence sweep completed"
                );
            }
            Ok(Ok(report)) => {
                debug!(scanned = report.scanned, "Presence sweep found nobody inactive");
            }
            Ok(Err(e)) => {
                error!(error = %e, "Presence sweep failed");
            }
            Err(e) => {
                error!(error = %e, "Presence sweep aborted");
            }
        }
    }
}

/// Runs one sweep: snapshot the registry, announce every stale participant's
/// departure, then evict them.
///
/// Eviction re-checks staleness against the same cutoff, so a participant who
/// heartbeats after the snapshot is kept.
#[instrument(skip(participants, messages, clock))]
pub async fn sweep_inactive_participants(
    participants: Arc<dyn ParticipantRepository + Send + Sync>,
    messages: Arc<dyn MessageRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
    inactivity_threshold: Duration,
) -> Result<SweepReport, AppError> {
    let snapshot = participants.list().await?;
    let now = clock.now();

    let mut report = SweepReport {
        scanned: snapshot.len(),
        ..SweepReport::default()
    };

    let Ok(threshold) = chrono::Duration::from_std(inactivity_threshold) else {
        warn!("Inactivity threshold out of range, nobody can be stale");
        return Ok(report);
    };
    let cutoff = now - threshold;

    let stale_names: Vec<String> = snapshot
        .into_iter()
        .filter(|participant| participant.is_stale(cutoff))
        .map(|participant| participant.name)
        .collect();
    report.stale = stale_names.len();

    if stale_names.is_empty() {
        return Ok(report);
    }

    for name in &stale_names {
        if let Err(e) = messages.append(&MessageModel::left(name, now)).await {
            report.failures += 1;
            warn!(name = %name, error = %e, "Failed to announce departure");
        }
    }

    for name in &stale_names {
        match participants.evict_if_stale(name, cutoff).await {
            Ok(true) => {
                report.evicted += 1;
                info!(name = %name, "Evicted inactive participant");
            }
            Ok(false) => {
                debug!(name = %name, "Participant active again or already gone, not evicted");
            }
            Err(e) => {
                report.failures += 1;
                warn!(name = %name, error = %e, "Failed to evict inactive participant");
            }
        }
    }

    Ok(report)
}
