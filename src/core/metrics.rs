use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn attempt_started(randomized: bool) {
    metrics::counter!(
        "quiz_attempts_started_total",
        "randomized" => if randomized { "true" } else { "false" }
    )
    .increment(1);
}

pub(crate) fn attempt_completed(timed_out: bool, score: f64) {
    metrics::counter!(
        "quiz_attempts_completed_total",
        "timed_out" => if timed_out { "true" } else { "false" }
    )
    .increment(1);
    metrics::histogram!("quiz_attempt_score").record(score);
}

pub(crate) fn scoring_fallback() {
    metrics::counter!("quiz_scoring_fallback_total").increment(1);
}
