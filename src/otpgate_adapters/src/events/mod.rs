pub mod broadcast_event_sink;
pub mod tracing_event_sink;

pub use broadcast_event_sink::BroadcastEventSink;
pub use tracing_event_sink::TracingEventSink;
