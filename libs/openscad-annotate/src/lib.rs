//! # OpenSCAD Annotate
//!
//! Splits an annotated OpenSCAD source into single-color variants.
//!
//! ## Architecture
//!
//! ```text
//! source text → scan (AnnotatedSource) → isolate × (group, color) → IsolatedVariant
//! ```
//!
//! The scanner runs once. Its output is read-only and every isolation pass
//! borrows it, so passes can run on any number of threads.
//!
//! ## Usage
//!
//! ```rust
//! use openscad_annotate::{isolate, scan, IsolationOptions, PropertyOverrides};
//!
//! let source = "color(\"red\") cube(1);\ncolor(\"green\") sphere(1);\n";
//! let annotated = scan(source, &PropertyOverrides::new());
//!
//! let variants: Vec<_> = annotated
//!     .units()
//!     .map(|unit| isolate(&annotated, unit, IsolationOptions::default()))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(variants.len(), 2);
//! ```

pub mod diagnostic;
pub mod error;
pub mod group;
pub mod invocation;
pub mod isolate;
pub mod properties;
pub mod scanner;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{IsolationError, SyntaxError};
pub use group::Group;
pub use isolate::{isolate, ForeignGroupPolicy, IsolatedVariant, IsolationOptions, IsolationUnit};
pub use properties::PropertyOverrides;
pub use scanner::{scan, AnnotatedSource, SourceLine};
