//! Skill documents: scanning, validation, the installed-skills store, and
//! installation from an upstream snapshot.
//!
//! A skill is a single markdown file. Its state lives in the file name:
//! `<id>.md` is enabled, `<id>.md.disabled` is installed but switched off.

pub mod catalog;
pub mod checks;
pub mod error;
pub mod install;
pub mod scan;
pub mod store;
pub mod threats;
pub mod types;
pub mod validate;

pub use error::{Error, Result};
