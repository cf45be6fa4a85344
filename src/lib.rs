//! Library crate for nmap-web-rs exposing reusable modules.
pub mod cache;
pub mod errors;
pub mod nmap;
pub mod parser;
pub mod server;
pub mod service;
pub mod types;
