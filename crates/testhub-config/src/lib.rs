#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]

//! Environment-driven configuration for the TestHub relay.
//!
//! Layout: `model.rs` (typed config structs), `defaults.rs` (baseline values mirroring the
//! production deployment), `validate.rs` (parsing helpers), `loader.rs` (environment lookup),
//! `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ENV_PREFIX;
pub use model::{LogFormatSetting, LoggingSettings, RelayConfig, RemoteConfig, ServerConfig};
