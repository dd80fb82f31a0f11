//! Format descriptors
//!
//! Plain value types describing a raw sample stream (`SignalDescriptor`)
//! and its byte-level representation (`EncodingDescriptor`).

mod encoding;
mod signal;

pub use encoding::{EncodingDescriptor, EncodingKind, OptionFlag};
pub use signal::{Audio, Sample, SignalDescriptor};
