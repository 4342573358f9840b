pub mod audit;
pub mod clock;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod presenter;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::build_app;
