// handlers/mod.rs - HTTP entry points
//
// public:    reachable without a bearer token (service info, registration lookups)
// protected: require an authenticated caller; each handler states its own permission gate

pub mod protected;
pub mod public;
