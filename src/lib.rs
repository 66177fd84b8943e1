//! The lib crate for a single-pass Jack to VM compiler.
//!
//! One class is compiled per call to [`compile`]: the scanner feeds tokens to a recursive-descent
//! parser that resolves names through a two-tier symbol table and writes stack-machine
//! instructions as it recognises each production.
#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]

/// Takes tokens from the scanner and emits VM code
pub mod compiler;

/// Error taxonomy shared by every stage.
pub mod error;

/// Per-session configuration.
pub mod options;

/// scanner scans!
pub mod scanner;

/// Variables and the class/subroutine scopes they live in.
pub mod symbols;

/// VM instructions and the writer that emits them.
pub mod vm;

pub use compiler::{compile, CompiledClass};
pub use error::{CompileError, CompileResult, ErrorCategory};
pub use options::{CompilerOptions, DoResultPolicy};
