//! Request/response correlation over the push transport.

pub mod correlator;
pub mod pending;

pub use correlator::Correlator;
pub use pending::PendingRequest;
