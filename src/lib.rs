//! Accelerator: a library of reusable features organized in a folder tree.
//!
//! A feature bundles up to three pieces of content (a prompt template, a
//! sequence diagram and a SQL query) and lives in exactly one folder. Folders
//! form a forest; [`hierarchy`] keeps it acyclic across every mutation.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod tree_render;

pub use error::{Error, Result};
