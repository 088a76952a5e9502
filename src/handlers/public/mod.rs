// handlers/public/mod.rs - Public handlers (no authentication required)
//
// A bearer token is still decoded when present, so a malformed one is rejected
// here too, but no identity is required.

pub mod filiales;
pub mod system;

pub use filiales::active as filiales_active;
pub use system::{fallback, health, root};
