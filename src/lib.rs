//! makegen: generate per-directory Makefiles from a template
//!
//! Every immediate entry of a root directory receives a copy of the
//! template in which the marker token (`EXEC_NAME` by default) is
//! replaced with the entry's name.
//!
//! # Architecture
//!
//! - [`domain`]: entities and rendering rules (no I/O)
//! - [`application`]: the generator service
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`config`]: layered settings
//! - [`cli`]: argument parsing, dispatch and output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{GenerateRequest, GeneratorService};
pub use domain::{EntryFilter, GenerationReport, Marker, Outcome, Template};
