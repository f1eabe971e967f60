//! demo-content - bundled demonstration content for the blog system
//!
//! Imports articles, video posts and pages from CSV files together with the
//! users, tags and images they reference, and removes everything it created
//! on request.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
