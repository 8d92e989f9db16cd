// DramaBox Gateway - Library root for testing

pub mod auth;
pub mod catalog;
pub mod config;
pub mod converters;
pub mod error;
pub mod http_client;
pub mod middleware;
pub mod models;
pub mod routes;
