//! audioflow - Offline Audio Effect Chains
//!
//! Applies an ordered list of named effects to an in-memory buffer of
//! interleaved 32-bit samples through a pluggable processing engine, and
//! returns the processed samples in the output format the effects produced.
//!
//! # Architecture
//!
//! - `format`: signal and encoding descriptors
//! - `effects`: effect specifications and argument parsing
//! - `engine`: the engine protocol and the bundled `NativeEngine`
//! - `io`: windowed file reads and verified writes
//! - `flow`: chain resolution, wiring and execution
//! - `session`: engine lifecycle plus the public operations

pub mod cli;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod flow;
pub mod format;
pub mod io;
pub mod session;

pub use config::{Config, EngineConfig, FlowConfig, Materialization};
pub use effects::EffectSpec;
pub use engine::{Engine, NativeEngine};
pub use error::{FlowError, Result};
pub use format::{Audio, EncodingDescriptor, EncodingKind, Sample, SignalDescriptor};
pub use io::ReadOptions;
pub use session::Session;
