use std::io::IsTerminal;

use async_trait::async_trait;

use crate::{event::MetricFamily, metrics::Gatherer, trace};

pub fn trace_init() {
    let color = std::io::stdout().is_terminal();
    let levels = std::env::var("TEST_LOG").unwrap_or_else(|_| "error".to_string());

    trace::init(color, false, &levels);
}

/// Hands out the same snapshot, or the same error, on every gather.
pub struct StaticGatherer {
    snapshot: Result<Vec<MetricFamily>, String>,
}

impl StaticGatherer {
    pub const fn new(families: Vec<MetricFamily>) -> Self {
        Self {
            snapshot: Ok(families),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            snapshot: Err(message.to_owned()),
        }
    }
}

#[async_trait]
impl Gatherer for StaticGatherer {
    async fn gather(&self) -> crate::Result<Vec<MetricFamily>> {
        self.snapshot.clone().map_err(Into::into)
    }
}
