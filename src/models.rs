// src/models.rs

pub mod auth;
pub mod case;
pub mod floor_plan;
pub mod franchise;
pub mod session;
pub mod validation;
