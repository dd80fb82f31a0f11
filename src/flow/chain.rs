//! Wired effect chain
//!
//! Stages are connected in order: the `input` endpoint, every effect, then
//! the `output` endpoint. Each connection feeds the running intermediate
//! descriptor forward so downstream stages see the shape upstream stages
//! produce.

use log::{debug, info};

use crate::engine::{Effect, FormatHandle};
use crate::error::{FlowError, Result};
use crate::format::{Sample, SignalDescriptor};

/// Samples requested from the source per read call
const READ_CHUNK: usize = 8192;

/// What a stage does
pub enum StageKind {
    /// Reads the source handle
    Input,
    /// Configured engine effect
    Effect(Box<dyn Effect>),
    /// Writes the sink handle
    Output,
}

/// One connected step of a chain
pub struct Stage {
    name: String,
    kind: StageKind,
    input: SignalDescriptor,
    output: SignalDescriptor,
}

impl Stage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &StageKind {
        &self.kind
    }

    /// Signal entering the stage
    pub fn input(&self) -> &SignalDescriptor {
        &self.input
    }

    /// Signal leaving the stage
    pub fn output(&self) -> &SignalDescriptor {
        &self.output
    }

    pub fn is_effect(&self) -> bool {
        matches!(self.kind, StageKind::Effect(_))
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

/// Single-shot chain between a source and a sink handle
pub struct Chain<'a> {
    target: SignalDescriptor,
    intermediate: Option<SignalDescriptor>,
    stages: Vec<Stage>,
    source: Option<&'a mut FormatHandle>,
    sink: Option<&'a mut FormatHandle>,
}

impl<'a> Chain<'a> {
    /// Create an empty chain converging on `target`
    pub fn new(target: SignalDescriptor) -> Self {
        Self {
            target,
            intermediate: None,
            stages: Vec::new(),
            source: None,
            sink: None,
        }
    }

    /// Attach the `input` endpoint
    pub fn add_input(&mut self, source: &'a mut FormatHandle) -> Result<()> {
        if self.source.is_some() {
            return Err(wiring("input", "chain already has an input"));
        }
        let signal = source.signal().clone();
        debug!("Chain input {}: {:?}", source.label(), signal);
        self.stages.push(Stage {
            name: "input".to_string(),
            kind: StageKind::Input,
            input: signal.clone(),
            output: signal.clone(),
        });
        self.intermediate = Some(signal);
        self.source = Some(source);
        Ok(())
    }

    /// Connect an effect after the current last stage
    pub fn add_effect(&mut self, name: &str, mut effect: Box<dyn Effect>) -> Result<()> {
        if self.sink.is_some() {
            return Err(wiring(name, "chain output is already attached"));
        }
        let input = self
            .intermediate
            .clone()
            .ok_or_else(|| wiring(name, "effect added before the chain input"))?;

        let output = effect
            .connect(&input, &self.target)
            .map_err(|e| FlowError::flow(name, e))?;
        output.validate().map_err(|e| wiring(name, e))?;

        debug!(
            "Chain effect {}: {} Hz x{} -> {} Hz x{}",
            name, input.rate, input.channels, output.rate, output.channels
        );
        self.stages.push(Stage {
            name: name.to_string(),
            kind: StageKind::Effect(effect),
            input,
            output: output.clone(),
        });
        self.intermediate = Some(output);
        Ok(())
    }

    /// Attach the `output` endpoint.
    ///
    /// The intermediate signal must match the sink's rate and channel count.
    pub fn add_output(&mut self, sink: &'a mut FormatHandle) -> Result<()> {
        let input = self
            .intermediate
            .clone()
            .ok_or_else(|| wiring("output", "output added before the chain input"))?;
        if self.sink.is_some() {
            return Err(wiring("output", "chain already has an output"));
        }

        let signal = sink.signal().clone();
        if !input.same_shape(&signal) {
            return Err(wiring(
                "output",
                format!(
                    "chain produces {} Hz x{} but the output expects {} Hz x{}",
                    input.rate, input.channels, signal.rate, signal.channels
                ),
            ));
        }

        debug!("Chain output {}: {:?}", sink.label(), signal);
        self.stages.push(Stage {
            name: "output".to_string(),
            kind: StageKind::Output,
            input,
            output: signal,
        });
        self.sink = Some(sink);
        Ok(())
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of engine effects between the endpoints
    pub fn effect_count(&self) -> usize {
        self.stages.iter().filter(|s| s.is_effect()).count()
    }

    /// Drain the source through every effect into the sink.
    ///
    /// Returns the number of samples written.
    pub fn run(mut self) -> Result<usize> {
        let source = self
            .source
            .take()
            .ok_or_else(|| wiring("input", "chain has no input"))?;
        let sink = self
            .sink
            .take()
            .ok_or_else(|| wiring("output", "chain has no output"))?;

        let mut samples = read_all(source)?;
        debug!("Chain read {} samples from {}", samples.len(), source.label());

        for stage in self.stages.iter_mut() {
            if let StageKind::Effect(effect) = &mut stage.kind {
                samples = effect
                    .process(samples)
                    .map_err(|e| FlowError::flow(&stage.name, e))?;
                let channels = stage.output.channels as usize;
                if samples.len() % channels != 0 {
                    return Err(wiring(
                        &stage.name,
                        format!(
                            "produced {} samples, not a whole number of {}-channel frames",
                            samples.len(),
                            channels
                        ),
                    ));
                }
            }
        }

        let written = sink.stream_mut()?.write(&samples);
        if written != samples.len() {
            return Err(wiring(
                "output",
                format!("wrote {} of {} samples", written, samples.len()),
            ));
        }

        info!(
            "Chain finished: {} effects, {} samples written to {}",
            self.effect_count(),
            written,
            sink.label()
        );
        Ok(written)
    }
}

impl Drop for Chain<'_> {
    fn drop(&mut self) {
        debug!("Releasing chain with {} stages", self.stages.len());
    }
}

fn read_all(source: &mut FormatHandle) -> Result<Vec<Sample>> {
    let capacity = source.signal().length.unwrap_or(0) as usize;
    let stream = source.stream_mut()?;

    let mut samples = Vec::with_capacity(capacity);
    let mut chunk = vec![0; READ_CHUNK];
    loop {
        let count = stream.read(&mut chunk);
        if count == 0 {
            break;
        }
        samples.extend_from_slice(&chunk[..count]);
    }
    Ok(samples)
}

fn wiring(stage: &str, reason: impl ToString) -> FlowError {
    FlowError::FlowExecution {
        stage: stage.to_string(),
        reason: reason.to_string(),
    }
}
