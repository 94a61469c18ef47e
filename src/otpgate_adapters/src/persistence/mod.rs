pub mod configured_session_store;
pub mod hashmap_secret_store;
pub mod hashmap_session_store;
pub mod redis_session_store;

pub use configured_session_store::ConfiguredSessionStore;
pub use hashmap_secret_store::HashMapSecretStore;
pub use hashmap_session_store::HashMapSessionStore;
pub use redis_session_store::RedisSessionStore;
