// src/services.rs

pub mod auth;
pub mod case_service;
pub mod floor_plan_service;
pub mod scope;
pub mod session;
pub mod token_store;
