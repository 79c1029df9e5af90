pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
