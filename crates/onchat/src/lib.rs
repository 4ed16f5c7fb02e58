//! Top-level facade crate for onchat.
//!
//! Re-exports the protocol core and the client runtime so users can depend on a single crate.

pub mod core {
    pub use onchat_core::*;
}

pub mod client {
    pub use onchat_client::*;
}
