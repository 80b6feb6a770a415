pub mod handler;
pub mod server;

pub use server::{router, spawn_gateway, start_server, ServerConfig, DEFAULT_PORT};
