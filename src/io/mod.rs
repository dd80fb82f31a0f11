//! Direct file access through the engine
//!
//! - `read_audio_file`: windowed read with range checks
//! - `write_audio_file`: whole-buffer write with count verification
//! - `get_info`: signal and encoding of a file

mod reader;
mod writer;

pub use reader::{get_info, read_audio_file, ReadOptions};
pub use writer::write_audio_file;
