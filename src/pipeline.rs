//! One gather, convert and persist cycle.

use std::time::Instant;

use snafu::{ResultExt, Snafu};

use crate::{
    convert::{self, ConvertError},
    internal_events::{PipelineRunCompleted, PipelineStageStarted},
    metrics::Gatherer,
    sinks::prometheus::remote_write::{PersistError, RemoteWriteSink},
};

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("Failed to gather metrics: {}", source))]
    Gather { source: crate::Error },

    #[snafu(display("Failed to convert metrics: {}", source))]
    Convert { source: ConvertError },

    #[snafu(display("Failed to persist metrics: {}", source))]
    Persist { source: PersistError },
}

pub struct Pipeline<G> {
    gatherer: G,
    sink: RemoteWriteSink,
}

impl<G: Gatherer> Pipeline<G> {
    pub const fn new(gatherer: G, sink: RemoteWriteSink) -> Self {
        Self { gatherer, sink }
    }

    /// Runs the cycle once and returns the number of series delivered.
    ///
    /// The first failing stage aborts the run; nothing is retried.
    pub async fn run_once(&self) -> Result<usize, PipelineError> {
        let start = Instant::now();

        emit!(PipelineStageStarted { stage: "gather" });
        let families = self.gatherer.gather().await.context(GatherSnafu)?;

        emit!(PipelineStageStarted { stage: "convert" });
        let time_series = convert::convert(&families).context(ConvertSnafu)?;
        let count = time_series.len();

        emit!(PipelineStageStarted { stage: "persist" });
        self.sink.persist(time_series).await.context(PersistSnafu)?;

        emit!(PipelineRunCompleted {
            families: families.len(),
            timeseries: count,
            elapsed: start.elapsed(),
        });
        Ok(count)
    }
}
