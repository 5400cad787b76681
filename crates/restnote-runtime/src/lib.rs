//! # Restnote Runtime
//!
//! Asynchronous cell execution for restnote.
//!
//! This crate contains:
//! - the Engine orchestrating parse -> transport -> normalize -> render
//! - the Transport SPI and the bundled reqwest transport
//! - the write-only response cache hook
//! - runtime configuration loading
//!
//! This crate does NOT care about:
//! - How cells are stored or displayed
//! - What the cache does with recorded responses
//! - How the surface schedules or cancels attempts

pub mod cache;
pub mod config;
pub mod engine;
pub mod transport;

pub use cache::{CacheWriteError, InMemoryResponseCache, ResponseCacheWriter};
pub use config::{load_config, parse_config, ConfigError, RuntimeConfig, TransportConfig};
pub use engine::{CellRun, Engine};
pub use transport::{ReqwestTransport, Transport};
