//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and cache calls into use-case level APIs.
//! - Keep controller layers decoupled from storage details.

pub mod personal_service;
