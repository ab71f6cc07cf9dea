//! # Config Crate
//!
//! Centralized configuration constants for the color-splitting pipeline.
//! All markers, naming patterns, and tunable parameters are defined here to
//! keep the scanner, the assembler, and the driver in agreement.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{COMMENT_PREFIX, MAIN_GROUP};
//!
//! let neutralized = format!("{COMMENT_PREFIX}color(\"red\") cube(1);");
//! assert!(neutralized.starts_with("//"));
//! assert_eq!(MAIN_GROUP, "main");
//! ```

pub mod constants;
