mod aws;
mod http_client;
mod pipeline;
mod prometheus;

pub use self::aws::*;
pub use self::http_client::*;
pub use self::pipeline::*;
pub use self::prometheus::*;

pub trait InternalEvent: Sized {
    fn emit(self);
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::internal_events::emit($event)
    };
}

pub mod error_stage {
    pub const PROCESSING: &str = "processing";
    pub const SENDING: &str = "sending";
}

pub mod error_type {
    pub const CONFIGURATION_FAILED: &str = "configuration_failed";
    pub const CONVERSION_FAILED: &str = "conversion_failed";
    pub const ENCODER_FAILED: &str = "encoder_failed";
    pub const REQUEST_FAILED: &str = "request_failed";
}
