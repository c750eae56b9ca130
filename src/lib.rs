//! Core library for playlist-drop
pub mod config;
pub mod models;
pub mod token;
pub mod api;
pub mod sync;
pub mod cache;
pub mod service;
pub mod server;
