//! Effects flow execution
//!
//! One call runs the whole pipeline:
//! 1. Validate the input and build the effect list
//! 2. Materialize the input as an engine source
//! 3. Open a temporary WAV sink shaped like the resolved target
//! 4. Wire and run the chain, then release it
//! 5. Close both handles and read the sink back
//!
//! Temporary files are removed on every path.

use log::{debug, info};

use super::builder::ChainBuilder;
use super::chain::Chain;
use super::materialize::materializer_for;
use super::temp::TempResource;
use crate::config::FlowConfig;
use crate::effects::EffectSpec;
use crate::engine::{ensure_ready, Engine, FormatHandle};
use crate::error::{FlowError, Result};
use crate::format::{Audio, EncodingDescriptor, Sample, SignalDescriptor};
use crate::io::{read_audio_file, ReadOptions};

/// Runs effect flows against one engine
pub struct FlowExecutor<'e> {
    engine: &'e dyn Engine,
    config: FlowConfig,
}

impl<'e> FlowExecutor<'e> {
    pub fn new(engine: &'e dyn Engine, config: FlowConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Apply `effects` to an interleaved buffer.
    ///
    /// The input length is taken from the buffer; `input_signal.length` is
    /// ignored. Returns the processed audio in the resolved output format.
    pub fn execute(
        &self,
        samples: &[Sample],
        input_signal: &SignalDescriptor,
        target_signal: Option<&SignalDescriptor>,
        target_encoding: Option<&EncodingDescriptor>,
        effects: &[EffectSpec],
    ) -> Result<Audio> {
        ensure_ready(self.engine)?;
        input_signal.validate()?;
        if samples.len() % input_signal.channels as usize != 0 {
            return Err(FlowError::InvalidDescriptor {
                reason: format!(
                    "{} samples is not a whole number of {}-channel frames",
                    samples.len(),
                    input_signal.channels
                ),
            });
        }
        let input = input_signal.clone().with_length(samples.len() as u64);

        let resolved = ChainBuilder::new(self.engine)
            .resolve_past_sentinel(self.config.resolve_past_sentinel)
            .build(&input, target_signal, target_encoding, effects)?;

        let materializer = materializer_for(self.config.materialization, self.engine);
        debug!(
            "Running {} effects via {} source: {} Hz x{} -> {} Hz x{}",
            resolved.stages.len(),
            materializer.name(),
            input.rate,
            input.channels,
            resolved.target_signal.rate,
            resolved.target_signal.channels
        );

        let mut source = materializer.materialize(self.engine, samples, &input)?;
        let sink_file = TempResource::new(self.engine.temp_path("wav"));
        let mut sink = FormatHandle::open_write(
            self.engine,
            sink_file.path(),
            &resolved.target_signal,
            Some(&resolved.target_encoding),
            Some("wav"),
        )?;

        {
            let mut chain = Chain::new(sink.signal().clone());
            chain.add_input(source.handle_mut())?;
            for prepared in resolved.stages {
                chain.add_effect(&prepared.spec.name, prepared.effect)?;
            }
            chain.add_output(&mut sink)?;
            chain.run()?;
        }

        sink.close()?;
        source.close()?;

        let read_options = ReadOptions {
            signal_hint: Some(resolved.target_signal.clone()),
            encoding_hint: Some(resolved.target_encoding.clone()),
            file_type: Some("wav".to_string()),
            ..ReadOptions::default()
        };
        let audio = read_audio_file(self.engine, sink_file.path(), &read_options)?;
        sink_file.remove()?;

        info!(
            "Effects flow produced {} frames at {} Hz x{}",
            audio.num_frames(),
            audio.rate,
            audio.channels
        );
        Ok(audio)
    }
}
