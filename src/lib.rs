pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
