use std::time::Duration;

use metrics::histogram;

use super::InternalEvent;

#[derive(Debug)]
pub struct PipelineStageStarted {
    pub stage: &'static str,
}

impl InternalEvent for PipelineStageStarted {
    fn emit(self) {
        debug!(message = "Starting pipeline stage.", stage = self.stage);
    }
}

#[derive(Debug)]
pub struct PipelineRunCompleted {
    pub families: usize,
    pub timeseries: usize,
    pub elapsed: Duration,
}

impl InternalEvent for PipelineRunCompleted {
    fn emit(self) {
        info!(
            message = "Shipped metrics snapshot.",
            families = %self.families,
            timeseries = %self.timeseries,
            elapsed_ms = %self.elapsed.as_millis(),
        );
        histogram!("pipeline_run_duration_seconds").record(self.elapsed);
    }
}
