//! # epitaph-core
//!
//! A library for decoding versioned binary crash-report artifacts into typed,
//! validated reports.
//!
//! This crate provides the core functionality for:
//! - Validating the artifact framing header (magic + format version)
//! - Decoding the payload message tree into a typed object graph
//! - Normalizing historical schema versions so every report exposes the same model
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`decoder`]: Header validation, payload decoding, and report building
//! - [`report`]: The immutable typed report model and its queries
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use epitaph_core::decode;
//! use std::fs;
//!
//! // Read a captured crash artifact
//! let data = fs::read("./crash.epitaph")?;
//!
//! // Decode it into a typed report, or fail with the first violated invariant
//! let report = decode(&data)?;
//!
//! println!(
//!     "{} v{} crashed with {} ({} threads)",
//!     report.application_info().identifier(),
//!     report.application_info().version(),
//!     report.signal_info().name(),
//!     report.threads().len(),
//! );
//!
//! if let Some(thread) = report.crashed_thread() {
//!     for frame in thread.frames() {
//!         let location = report
//!             .find_image(frame.instruction_pointer())
//!             .map(|image| image.name())
//!             .unwrap_or("???");
//!         println!("  {:#018x} {}", frame.instruction_pointer(), location);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Guarantees
//!
//! Decoding is pure and synchronous: one call over an in-memory buffer,
//! returning either a fully valid [`CrashReport`] or a single typed
//! [`Error`] describing the first violated invariant. The returned report is
//! immutable and may be shared across threads for concurrent reads.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod decoder;
pub mod error;
pub mod report;

// Re-export primary types for convenience
pub use decoder::{decode, FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use error::{Error, Result};
pub use report::{
    ApplicationInfo, Architecture, BinaryImageInfo, CrashReport, ExceptionInfo, MachExceptionInfo,
    MachineInfo, OperatingSystem, ProcessInfo, ProcessorInfo, RegisterInfo, SignalInfo,
    StackFrameInfo, SymbolInfo, SystemInfo, ThreadInfo, TypeEncoding,
};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
