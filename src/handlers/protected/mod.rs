// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler follows the same pipeline: path id, permission gate, caller
// identity for mutations, query/body decoding, then exactly one service call
// whose result becomes the response envelope.

pub mod auth;
pub mod filiales;
pub mod kb_categories;
pub mod permissions;
pub mod request_sources;
pub mod service_request_types;
pub mod service_requests;
pub mod statistics;
pub mod time_entries;
