// src/handlers.rs

pub mod auth;
pub mod cases;
pub mod floor_plans;
