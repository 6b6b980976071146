//! Core orchestration for the EO command-line toolkit.
//!
//! This crate does not parse or compile EO itself. It sequences calls into
//! the external tools that do: the Maven plugin suite (through the `mvnw`
//! wrapper) and the `eo2js` transpiler. A request flows roughly as:
//!
//!   Options
//!     -> version    (parser version gate, Maven Central lookups)
//!     -> resolver   (terminal command -> ordered prerequisite chain)
//!     -> pipeline   (compose stages from the per-platform registry)
//!     -> flags      (exact argument vectors)
//!     -> runner     (spawn, wait, map exit codes; progress overlay)
//!
//! The CLI crate should depend on this crate rather than reimplementing
//! any of the steps above.

// ---------------------------------------------------------------------
// Error handling and shared data
// ---------------------------------------------------------------------

pub mod error;
pub mod options;

// ---------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------

pub mod version;
pub mod central;

// ---------------------------------------------------------------------
// Invocation building and execution
// ---------------------------------------------------------------------

pub mod flags;
pub mod elapsed;
pub mod progress;
pub mod runner;

// ---------------------------------------------------------------------
// Commands and pipeline composition
// ---------------------------------------------------------------------

pub mod command;
pub mod commands;
pub mod registry;
pub mod resolver;
pub mod pipeline;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use command::{CommandDescriptor, Context, Toolchain};
pub use error::CoreError;
pub use options::{Options, Platform};
pub use pipeline::{PipelineRequest, run_pipeline};
pub use registry::Registry;
pub use runner::{ProcessRunner, Runner};
