//! `todos`: terminal to-do client library.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod store;
pub mod ui;
