pub mod clock;
pub mod config;
pub mod events;
pub mod handlers;
pub mod persistence;
pub mod telemetry;
pub mod verification;

pub use clock::SystemClock;
pub use config::{ConfigHandle, GateSettings, SettingsError};
pub use events::{BroadcastEventSink, TracingEventSink};
pub use handlers::render_outcome::{message_for, render_outcome};
pub use persistence::{
    ConfiguredSessionStore, HashMapSecretStore, HashMapSessionStore, RedisSessionStore,
};
pub use telemetry::init_tracing;
pub use verification::TotpRsVerifier;
