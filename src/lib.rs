pub mod app;
pub mod config;
pub mod error;
pub mod platform;
pub mod policy;
pub mod webhook;
pub mod workflow;
