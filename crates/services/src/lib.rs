//! Pandamonium service tier
//!
//! Forwards record operations to a remote persistence API:
//! - [`rest`]: the HTTP client adapter, a [`RestClient`] trait and its
//!   reqwest implementation with per-call connect and read timeouts
//! - [`records`]: proxies for proofs and definitions that absorb every
//!   transport failure into an empty result

pub mod records;
pub mod rest;

pub use records::{DefinitionService, ProofService, RecordService};
pub use rest::{RestClient, RestService, Timeouts, TransportError};
