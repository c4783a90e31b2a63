// src/models.rs

pub mod activity;
pub mod announcement;
pub mod auth;
pub mod cash;
pub mod inquiry;
pub mod settings;
pub mod slot;
pub mod user;
