//! Build-script translation pipeline.
//!
//! ```text
//! script text ──► scanner ──► (instruction, parameter block) pairs
//!                                    │ dispatch
//!                                    ▼
//!                               BuildState ──► definition ──► recipe text
//! ```
//!
//! The scanner and argument grammar are pure; the translator owns the
//! mutable build state and routes each instruction to its handler.

pub mod definition;
pub mod grammar;
pub mod scanner;
pub mod state;
pub mod translate;

pub use scanner::RawInstruction;
pub use state::{BuildState, BOOTSTRAP_DOCKER};
pub use translate::{InstructionKind, Translator};
