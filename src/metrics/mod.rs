use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use tracing::error;

lazy_static! {
    pub static ref VOTES_RECORDED: IntCounter =
        IntCounter::new("votes_recorded_total", "Votes durably recorded in the ledger")
            .expect("metric can not be created");

    /// Duplicate attempts, labelled by the layer that caught them:
    /// `cache`, `precheck` or `constraint`.
    pub static ref DUPLICATE_VOTES: IntCounterVec = IntCounterVec::new(
        Opts::new("duplicate_votes_total", "Rejected duplicate vote attempts"),
        &["layer"]
    )
    .expect("metric can not be created");

    pub static ref REJECTED_VOTES: IntCounterVec = IntCounterVec::new(
        Opts::new("rejected_votes_total", "Vote attempts rejected for a business reason"),
        &["reason"]
    )
    .expect("metric can not be created");

    pub static ref LIFECYCLE_TRANSITIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("lifecycle_transitions_total", "Poll lifecycle transitions by target state"),
        &["state"]
    )
    .expect("metric can not be created");

    pub static ref TALLY_DRIFT_CORRECTIONS: IntCounter = IntCounter::new(
        "tally_drift_corrections_total",
        "Cached poll totals corrected by a ledger recount"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_custom_metrics(&registry);
        registry
    };
}

fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(VOTES_RECORDED.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(DUPLICATE_VOTES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(REJECTED_VOTES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(LIFECYCLE_TRANSITIONS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(TALLY_DRIFT_CORRECTIONS.clone()))
        .expect("collector can be registered");
}

/// Renders every registered metric in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
