// src/middleware.rs

pub mod auth;
pub mod guards;
