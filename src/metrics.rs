use anyhow::Result;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process; later calls reuse it.
    pub fn init() -> Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

        let handle = HANDLE.get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            describe_all();
            Ok::<_, anyhow::Error>(handle)
        })?;

        Ok(Self {
            handle: handle.clone(),
        })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("research_runs_total", "Research pipeline invocations.");
    describe_counter!("research_sources_total", "Candidate sources analysed.");
    describe_counter!(
        "research_source_failures_total",
        "Candidate sources whose page could not be fetched."
    );
    describe_counter!("fetch_errors_total", "Page fetch failures by kind.");
    describe_counter!("history_appends_total", "Entries appended to the research history.");
    describe_histogram!("research_duration_ms", "Research pipeline wall time in milliseconds.");
}
