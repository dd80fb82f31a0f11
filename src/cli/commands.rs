//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use super::sox_args::SoxArgs;
use crate::effects::EffectSpec;
use crate::error::{FlowError, Result};
use crate::format::{Audio, EncodingDescriptor, SignalDescriptor};
use crate::io::ReadOptions;
use crate::session::Session;

/// Run a sox-style command line.
pub fn sox(session: &Session, args: &[String]) -> Result<Audio> {
    let known = session.list_effect_names()?;
    let sox = SoxArgs::parse(args, &known)?;

    let mut options = ReadOptions::new();
    if let Some(file_type) = &sox.input.file_type {
        options = options.file_type(file_type.clone());
    }
    if let (Some(rate), Some(channels)) = (sox.input.rate, sox.input.channels) {
        options = options.signal_hint(SignalDescriptor::new(rate, channels, sox.input_precision()));
        options = options.encoding_hint(EncodingDescriptor::signed(sox.input_precision()));
    }

    let mut audio = session.read_audio_file(Path::new(&sox.input.path), &options)?;
    if let Some(channels) = sox.input.channels {
        reinterpret_channels(&mut audio, channels)?;
    }

    let input = SignalDescriptor::new(audio.rate, audio.channels, sox.input_precision());
    let plan = sox.plan(&input)?;
    info!(
        "sox: {} -> {} via [{}]",
        sox.input.path,
        sox.output.path,
        plan.effects
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let result = session.run_effects_flow(&audio.samples, &input, Some(&plan.target), None, &plan.effects)?;

    if !sox.output.is_pipe() {
        let signal = SignalDescriptor::new(result.rate, result.channels, plan.target.precision);
        session.write_audio_file(
            Path::new(&sox.output.path),
            &result.samples,
            &signal,
            None,
            sox.output.file_type.as_deref(),
        )?;
        println!(
            "Wrote {} ({} frames, {} Hz, {} ch)",
            sox.output.path,
            result.num_frames(),
            result.rate,
            result.channels
        );
    }
    Ok(result)
}

/// Treat the decoded buffer as having `channels` interleaved channels
fn reinterpret_channels(audio: &mut Audio, channels: u32) -> Result<()> {
    if audio.channels == channels {
        return Ok(());
    }
    if audio.samples.len() % channels as usize != 0 {
        return Err(FlowError::InvalidCommand {
            reason: format!(
                "{} samples cannot be split into {} channels",
                audio.samples.len(),
                channels
            ),
        });
    }
    info!("Reinterpreting {} channels as {}", audio.channels, channels);
    audio.channels = channels;
    Ok(())
}

/// Print the signal and encoding of a file.
pub fn info(session: &Session, path: &Path) -> Result<()> {
    let (signal, encoding) = session.get_info(path)?;

    println!("File:        {}", path.display());
    println!("Sample rate: {}", signal.rate);
    println!("Channels:    {}", signal.channels);
    println!("Precision:   {}-bit", signal.precision);
    println!("Encoding:    {:?} {}-bit", encoding.kind, encoding.bits_per_sample);
    match signal.length {
        Some(length) => {
            let frames = length / signal.channels.max(1) as u64;
            println!("Samples:     {} ({} frames)", length, frames);
            println!("Duration:    {:.3}s", frames as f64 / signal.rate);
        }
        None => println!("Samples:     unknown"),
    }
    Ok(())
}

/// List the effects the engine provides.
pub fn effects(session: &Session) -> Result<()> {
    let registry = session.engine().registry();
    for name in session.list_effect_names()? {
        match registry.info(&name) {
            Some(info) => println!("{:<10} {:<34} {}", name, info.usage, info.description),
            None => println!("{}", name),
        }
    }
    Ok(())
}

/// Load an effect chain from a JSON file.
pub fn load_chain(path: &Path) -> Result<Vec<EffectSpec>> {
    let text = std::fs::read_to_string(path)?;
    let chain: Vec<EffectSpec> = serde_json::from_str(&text)?;
    if chain.is_empty() {
        return Ok(vec![EffectSpec::no_effects()]);
    }
    Ok(chain)
}

/// Apply a JSON effect chain to a file.
pub fn run(
    session: &Session,
    input: &Path,
    output: &Path,
    chain: &Path,
    precision: Option<u32>,
) -> Result<Audio> {
    let effects = load_chain(chain)?;
    let audio = session.read_audio_file(input, &ReadOptions::default())?;
    let (source_signal, _) = session.get_info(input)?;

    let signal = SignalDescriptor::new(audio.rate, audio.channels, source_signal.precision);
    let target = precision.map(|bits| {
        let mut target = signal.clone();
        target.precision = bits;
        target
    });

    let result =
        session.run_effects_flow(&audio.samples, &signal, target.as_ref(), None, &effects)?;

    let out_signal = SignalDescriptor::new(
        result.rate,
        result.channels,
        precision.unwrap_or(source_signal.precision),
    );
    session.write_audio_file(output, &result.samples, &out_signal, None, None)?;
    println!(
        "Wrote {} ({} frames, {} Hz, {} ch)",
        output.display(),
        result.num_frames(),
        result.rate,
        result.channels
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::engine::NativeEngine;
    use crate::format::Sample;
    use tempfile::tempdir;

    fn setup(dir: &Path) -> Session {
        let session =
            Session::init(NativeEngine::with_temp_dir(dir), FlowConfig::default()).unwrap();
        let samples: Vec<Sample> = (0..1600).map(|i| ((i % 40) - 20) << 24).collect();
        let signal = SignalDescriptor::new(16000.0, 2, 16);
        session
            .write_audio_file(&dir.join("in.wav"), &samples, &signal, None, None)
            .unwrap();
        session
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_sox_command_writes_output() {
        let dir = tempdir().unwrap();
        let session = setup(dir.path());
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");

        let line = format!(
            "sox {} -b 16 {} rate 8000 channels 1",
            input.display(),
            output.display()
        );
        let result = sox(&session, &args(&line)).unwrap();
        assert_eq!(result.rate, 8000.0);
        assert_eq!(result.channels, 1);

        let (signal, _) = session.get_info(&output).unwrap();
        assert_eq!(signal.rate, 8000.0);
        assert_eq!(signal.channels, 1);
        assert_eq!(signal.precision, 16);
        assert_eq!(signal.length, Some(400));
    }

    #[test]
    fn test_sox_speed_and_remix() {
        let dir = tempdir().unwrap();
        let session = setup(dir.path());
        let input = dir.path().join("in.wav");

        let line = format!("sox {} - speed 2 remix 2 1", input.display());
        let result = sox(&session, &args(&line)).unwrap();
        assert_eq!(result.rate, 16000.0);
        assert_eq!(result.channels, 2);
        assert_eq!(result.num_frames(), 400);
    }

    #[test]
    fn test_run_with_json_chain() {
        let dir = tempdir().unwrap();
        let session = setup(dir.path());
        let chain = dir.path().join("chain.json");
        std::fs::write(
            &chain,
            r#"[{"name": "channels", "args": ["1"]}, {"name": "vol", "args": ["0.5"]}]"#,
        )
        .unwrap();

        let output = dir.path().join("mono.wav");
        let result = run(&session, &dir.path().join("in.wav"), &output, &chain, None).unwrap();
        assert_eq!(result.channels, 1);
        assert_eq!(result.num_frames(), 800);
        assert!(output.exists());
    }

    #[test]
    fn test_empty_chain_file() {
        let dir = tempdir().unwrap();
        let chain = dir.path().join("empty.json");
        std::fs::write(&chain, "[]").unwrap();
        assert_eq!(load_chain(&chain).unwrap(), vec![EffectSpec::no_effects()]);
    }

    #[test]
    fn test_reinterpret_channels() {
        let mut audio = Audio {
            rate: 8000.0,
            channels: 1,
            samples: vec![1, 2, 3, 4],
        };
        reinterpret_channels(&mut audio, 2).unwrap();
        assert_eq!(audio.num_frames(), 2);
        assert!(reinterpret_channels(&mut audio, 3).is_err());
    }
}
