//! # edgesync-renderer
//!
//! Tera-based template engine that renders VCL snippet content from embedded
//! template sets, optionally overridden by a user template directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use edgesync_core::types::{Config, ServiceId};
//! use edgesync_renderer::TemplateEngine;
//!
//! fn print_recv(config: &Config) {
//!     if let Ok(engine) = TemplateEngine::from_config(config) {
//!         if let Ok(vcl) = engine.read_template("default", "recv") {
//!             println!("{vcl}");
//!         }
//!     }
//! }
//!
//! print_recv(&Config::new(ServiceId::from("svc"), "key"));
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::VclContext;
pub use engine::{template_name, TemplateEngine};
pub use error::RenderError;
