pub mod analyze;
pub mod health;
pub mod models;
pub mod openapi;
pub mod steps;
