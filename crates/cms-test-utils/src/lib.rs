//! Shared test utilities for the content engine workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`site`]: [`TestSite`] builder writing a configuration and content
//!   files into a temporary directory
//! - [`services`]: scripted translation, credential and backend
//!   collaborators that record how they were called

pub mod services;
pub mod site;

pub use services::{RecordingBackend, ScriptedCredentials, ScriptedTranslator};
pub use site::{BLOG_SITE, TestSite};
