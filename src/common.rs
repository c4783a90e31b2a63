// src/common.rs

pub mod error;
pub mod hierarchy;
pub mod pagination;
