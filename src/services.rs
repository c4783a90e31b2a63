// src/services.rs

pub mod access;
pub mod announcement_service;
pub mod auth;
pub mod cash_service;
pub mod inquiry_service;
pub mod slot_service;
pub mod user_service;
