pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod media;
pub mod models;
pub mod services;
pub mod web;
