//! Effects flows
//!
//! Builds a chain from a list of `EffectSpec`s, runs it over an in-memory
//! buffer through the engine, and returns the result in the resolved output
//! format.

pub mod builder;
pub mod chain;
pub mod executor;
pub mod materialize;
mod temp;

pub use builder::{resolve_target, ChainBuilder, PreparedEffect, ResolvedChain};
pub use chain::{Chain, Stage, StageKind};
pub use executor::FlowExecutor;
pub use materialize::{
    materializer_for, MaterializedSource, MemorySource, SourceMaterializer, TempFileSource,
};
pub use temp::TempResource;
