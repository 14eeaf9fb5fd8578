#![deny(missing_docs)]

//! Core types shared by every arbores crate: the error taxonomy, the
//! process-wide deterministic random source and provenance descriptors.

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ArgError, ErrorInfo};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::RngHandle;
