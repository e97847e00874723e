pub mod api;
pub mod attendance;
pub mod config;
pub mod db;
pub mod error;
pub mod face;
pub mod models;
pub mod services;
pub mod state;
