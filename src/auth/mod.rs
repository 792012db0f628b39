//! Authentication layer: launch-data verification and session tokens.

pub mod middleware;
pub mod token;
pub mod verify;

pub use middleware::{AppState, AuthUser};
pub use token::{generate_reference, generate_session_token, sha256_hex};
pub use verify::calculate_hashes;
