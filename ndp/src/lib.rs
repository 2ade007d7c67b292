//! An IPv6 Neighbor Discovery Protocol engine (RFC 4861) with Duplicate
//! Address Detection (RFC 4862 §5.4): neighbor cache and reachability state
//! machine, default router list, on-link prefix list, destination cache,
//! and address resolution, driven by a small [`collaborators::Collaborators`]
//! trait so it is not tied to any particular socket or runtime.

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod dad;
pub mod destination;
pub mod engine;
pub mod error;
pub mod ids;
pub mod message;
pub mod neighbor;
pub mod prefix;
pub mod resolver;
pub mod router;
pub mod timer;

pub use collaborators::Collaborators;
pub use config::Config;
pub use engine::NdpEngine;
pub use error::{CacheError, ConfigError, DadOutcome, MessageError, ResolveError, ResolveOutcome};
pub use ids::IfId;
