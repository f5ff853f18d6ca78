//! Prometheus-compatible metrics registry.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Counters and gauges exported at /metrics.
#[derive(Clone)]
pub struct MetricsRegistry {
    start_time: Instant,

    /// HTTP request metrics
    pub http_requests_total: Arc<AtomicU64>,
    pub http_requests_active: Arc<AtomicU64>,
    pub http_request_duration_seconds: Arc<RwLock<Vec<f64>>>,

    /// Wager metrics
    pub bets_settled_total: Arc<AtomicU64>,
    pub bets_won_total: Arc<AtomicU64>,
    pub stake_cents_total: Arc<AtomicU64>,
    pub payout_cents_total: Arc<AtomicU64>,

    /// Mines round metrics
    pub mines_rounds_started_total: Arc<AtomicU64>,
    pub mines_rounds_busted_total: Arc<AtomicU64>,
    pub mines_rounds_cashed_out_total: Arc<AtomicU64>,
    pub mines_rounds_active: Arc<AtomicU64>,

    /// Error metrics
    pub errors_total: Arc<AtomicU64>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),

            http_requests_total: Arc::new(AtomicU64::new(0)),
            http_requests_active: Arc::new(AtomicU64::new(0)),
            http_request_duration_seconds: Arc::new(RwLock::new(Vec::new())),

            bets_settled_total: Arc::new(AtomicU64::new(0)),
            bets_won_total: Arc::new(AtomicU64::new(0)),
            stake_cents_total: Arc::new(AtomicU64::new(0)),
            payout_cents_total: Arc::new(AtomicU64::new(0)),

            mines_rounds_started_total: Arc::new(AtomicU64::new(0)),
            mines_rounds_busted_total: Arc::new(AtomicU64::new(0)),
            mines_rounds_cashed_out_total: Arc::new(AtomicU64::new(0)),
            mines_rounds_active: Arc::new(AtomicU64::new(0)),

            errors_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a completed HTTP request
    pub async fn record_http_request(&self, duration: Duration, success: bool) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);

        let mut durations = self.http_request_duration_seconds.write().await;
        durations.push(duration.as_secs_f64());

        // Keep only recent durations (last 1000)
        if durations.len() > 1000 {
            let excess = durations.len() - 1000;
            durations.drain(0..excess);
        }

        if !success {
            self.errors_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Record a settled single-shot wager
    pub fn record_bet(&self, stake_cents: i64, payout_cents: i64, won: bool) {
        self.bets_settled_total.fetch_add(1, Ordering::SeqCst);
        self.stake_cents_total
            .fetch_add(stake_cents.max(0) as u64, Ordering::SeqCst);
        self.payout_cents_total
            .fetch_add(payout_cents.max(0) as u64, Ordering::SeqCst);
        if won {
            self.bets_won_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_mines_start(&self, stake_cents: i64) {
        self.mines_rounds_started_total.fetch_add(1, Ordering::SeqCst);
        self.mines_rounds_active.fetch_add(1, Ordering::SeqCst);
        self.stake_cents_total
            .fetch_add(stake_cents.max(0) as u64, Ordering::SeqCst);
    }

    pub fn record_mines_bust(&self) {
        self.mines_rounds_busted_total.fetch_add(1, Ordering::SeqCst);
        self.decrement_active_rounds();
    }

    pub fn record_mines_cashout(&self, payout_cents: i64) {
        self.mines_rounds_cashed_out_total
            .fetch_add(1, Ordering::SeqCst);
        self.payout_cents_total
            .fetch_add(payout_cents.max(0) as u64, Ordering::SeqCst);
        self.decrement_active_rounds();
    }

    /// A stale round replaced by a fresh start leaves the gauge through here.
    pub fn record_mines_discard(&self) {
        self.decrement_active_rounds();
    }

    fn decrement_active_rounds(&self) {
        // Rounds that predate this process were never counted, so the gauge
        // saturates at zero instead of wrapping.
        let _ = self
            .mines_rounds_active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus metrics format
    pub async fn to_prometheus_format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "# HELP stakehouse_uptime_seconds Process uptime in seconds\n\
             # TYPE stakehouse_uptime_seconds gauge\n\
             stakehouse_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        output.push_str(&format!(
            "# HELP stakehouse_http_requests_total Total number of HTTP requests\n\
             # TYPE stakehouse_http_requests_total counter\n\
             stakehouse_http_requests_total {}\n\n",
            self.http_requests_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_http_requests_active Currently active HTTP requests\n\
             # TYPE stakehouse_http_requests_active gauge\n\
             stakehouse_http_requests_active {}\n\n",
            self.http_requests_active.load(Ordering::SeqCst)
        ));

        // Response time percentiles over the recent window
        let durations = self.http_request_duration_seconds.read().await;
        if !durations.is_empty() {
            let mut sorted_durations = durations.clone();
            sorted_durations.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let p50_idx = (sorted_durations.len() as f64 * 0.50) as usize;
            let p95_idx = (sorted_durations.len() as f64 * 0.95) as usize;
            let p99_idx = (sorted_durations.len() as f64 * 0.99) as usize;

            output.push_str(&format!(
                "# HELP stakehouse_http_request_duration_seconds HTTP request duration percentiles\n\
                 # TYPE stakehouse_http_request_duration_seconds gauge\n\
                 stakehouse_http_request_duration_seconds{{quantile=\"0.50\"}} {}\n\
                 stakehouse_http_request_duration_seconds{{quantile=\"0.95\"}} {}\n\
                 stakehouse_http_request_duration_seconds{{quantile=\"0.99\"}} {}\n\n",
                sorted_durations.get(p50_idx).unwrap_or(&0.0),
                sorted_durations.get(p95_idx).unwrap_or(&0.0),
                sorted_durations.get(p99_idx).unwrap_or(&0.0)
            ));
        }
        drop(durations);

        output.push_str(&format!(
            "# HELP stakehouse_bets_settled_total Total number of settled wagers\n\
             # TYPE stakehouse_bets_settled_total counter\n\
             stakehouse_bets_settled_total {}\n\n",
            self.bets_settled_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_bets_won_total Total number of winning wagers\n\
             # TYPE stakehouse_bets_won_total counter\n\
             stakehouse_bets_won_total {}\n\n",
            self.bets_won_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_stake_cents_total Total cents staked\n\
             # TYPE stakehouse_stake_cents_total counter\n\
             stakehouse_stake_cents_total {}\n\n",
            self.stake_cents_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_payout_cents_total Total cents paid out\n\
             # TYPE stakehouse_payout_cents_total counter\n\
             stakehouse_payout_cents_total {}\n\n",
            self.payout_cents_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_mines_rounds_started_total Mines rounds started\n\
             # TYPE stakehouse_mines_rounds_started_total counter\n\
             stakehouse_mines_rounds_started_total {}\n\n",
            self.mines_rounds_started_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_mines_rounds_busted_total Mines rounds ended on a mine\n\
             # TYPE stakehouse_mines_rounds_busted_total counter\n\
             stakehouse_mines_rounds_busted_total {}\n\n",
            self.mines_rounds_busted_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_mines_rounds_cashed_out_total Mines rounds cashed out\n\
             # TYPE stakehouse_mines_rounds_cashed_out_total counter\n\
             stakehouse_mines_rounds_cashed_out_total {}\n\n",
            self.mines_rounds_cashed_out_total.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_mines_rounds_active Mines rounds currently in progress\n\
             # TYPE stakehouse_mines_rounds_active gauge\n\
             stakehouse_mines_rounds_active {}\n\n",
            self.mines_rounds_active.load(Ordering::SeqCst)
        ));

        output.push_str(&format!(
            "# HELP stakehouse_errors_total Total number of failed requests\n\
             # TYPE stakehouse_errors_total counter\n\
             stakehouse_errors_total {}\n",
            self.errors_total.load(Ordering::SeqCst)
        ));

        output
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_show_up_in_export() {
        let metrics = MetricsRegistry::new();
        metrics.record_bet(100, 196, true);
        metrics.record_bet(100, 0, false);
        metrics.record_mines_start(200);
        metrics.record_mines_cashout(245);
        metrics
            .record_http_request(Duration::from_millis(5), true)
            .await;
        metrics
            .record_http_request(Duration::from_millis(7), false)
            .await;

        let output = metrics.to_prometheus_format().await;
        assert!(output.contains("stakehouse_bets_settled_total 2"));
        assert!(output.contains("stakehouse_bets_won_total 1"));
        assert!(output.contains("stakehouse_stake_cents_total 300"));
        assert!(output.contains("stakehouse_payout_cents_total 441"));
        assert!(output.contains("stakehouse_mines_rounds_started_total 1"));
        assert!(output.contains("stakehouse_mines_rounds_cashed_out_total 1"));
        assert!(output.contains("stakehouse_mines_rounds_active 0"));
        assert!(output.contains("stakehouse_http_requests_total 2"));
        assert!(output.contains("stakehouse_errors_total 1"));
        assert!(output.contains("quantile=\"0.95\""));
    }

    #[test]
    fn active_round_gauge_saturates_at_zero() {
        let metrics = MetricsRegistry::new();
        metrics.record_mines_bust();
        assert_eq!(metrics.mines_rounds_active.load(Ordering::SeqCst), 0);

        metrics.record_mines_start(100);
        metrics.record_mines_start(100);
        metrics.record_mines_discard();
        metrics.record_mines_cashout(245);
        assert_eq!(metrics.mines_rounds_active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duration_window_is_bounded() {
        let metrics = MetricsRegistry::new();
        for _ in 0..1_100 {
            metrics
                .record_http_request(Duration::from_millis(1), true)
                .await;
        }
        assert_eq!(
            metrics.http_request_duration_seconds.read().await.len(),
            1_000
        );
    }
}
