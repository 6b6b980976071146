//! The concrete command tables.
//!
//! `common` commands behave the same on every platform; `java` and
//! `javascript` supply the platform-specific halves of the build.

pub mod common;
pub mod java;
pub mod javascript;

pub use common::common;
pub use java::java;
pub use javascript::javascript;
