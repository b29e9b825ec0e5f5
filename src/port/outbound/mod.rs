//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the persistence dependencies of the engine.
//! Whether an implementation talks to a local database or a remote service
//! is invisible to the application layer.

pub mod store;
