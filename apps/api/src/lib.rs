pub mod analysis;
pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod llm_client;
pub mod ranking;
pub mod render;
pub mod routes;
pub mod state;
pub mod views;
pub mod workspace;
