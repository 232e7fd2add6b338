//! Login gate.
//!
//! A placeholder gate: the submitted pair is compared in plaintext against
//! the configured reference pair. There is no hashing, lockout, or token.

mod gate;

pub use gate::{CredentialGate, INVALID_CREDENTIALS};
