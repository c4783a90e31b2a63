// src/handlers.rs

pub mod activity;
pub mod announcements;
pub mod auth;
pub mod cash;
pub mod inquiries;
pub mod settings;
pub mod slots;
pub mod users;
