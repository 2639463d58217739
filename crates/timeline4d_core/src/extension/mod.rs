//! Viewer tool extension contracts.
//!
//! Tools are capability providers the host registers explicitly at startup;
//! nothing registers itself against global state.

pub mod kernel;
