pub mod argsets;
pub mod auth;
pub mod client;
pub mod command;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod helpers;
pub mod interfaces;
pub mod offline;
pub mod routes;
