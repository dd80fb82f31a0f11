//! Shared test helpers
//!
//! `MockEngine` keeps written audio in memory (plus an empty marker file on
//! disk so temp-file cleanup can be observed) and can be scripted to fail at
//! specific steps. It counts opened and closed streams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use audioflow::engine::{AudioStream, Effect, Engine, EngineError, EngineResult, FormatHints};
use audioflow::{EncodingDescriptor, Sample, SignalDescriptor};

type Store = Arc<Mutex<HashMap<PathBuf, (SignalDescriptor, Vec<Sample>)>>>;

/// Failure points a `MockEngine` can be told to hit
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    /// Writers accept one sample fewer than offered
    pub short_write: bool,
    /// Every seek reports end of stream
    pub seek_fails: bool,
    /// Readers report no total length
    pub unknown_length: bool,
    /// `open_mem_read` is unavailable
    pub no_memory_streams: bool,
    /// Writers fail to finalize on close
    pub close_fails: bool,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub memory_opens: AtomicUsize,
    temp_serial: AtomicUsize,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn memory_opens(&self) -> usize {
        self.memory_opens.load(Ordering::SeqCst)
    }
}

pub struct MockEngine {
    script: MockScript,
    temp_dir: PathBuf,
    store: Store,
    counters: Arc<Counters>,
    running: AtomicBool,
}

impl MockEngine {
    pub fn new(temp_dir: &Path, script: MockScript) -> Self {
        Self {
            script,
            temp_dir: temp_dir.to_path_buf(),
            store: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
            running: AtomicBool::new(false),
        }
    }

    /// A started engine
    pub fn running(temp_dir: &Path, script: MockScript) -> Self {
        let engine = Self::new(temp_dir, script);
        engine.init().unwrap();
        engine
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Put audio at `path` without going through a writer
    pub fn insert(&self, path: &Path, signal: SignalDescriptor, samples: Vec<Sample>) {
        self.store
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), (signal, samples));
    }

    fn stream(&self, signal: SignalDescriptor, data: Vec<Sample>, sink: Option<PathBuf>) -> MockStream {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        MockStream {
            encoding: EncodingDescriptor::signed(signal.precision),
            signal,
            data,
            position: 0,
            sink,
            store: Arc::clone(&self.store),
            counters: Arc::clone(&self.counters),
            script: self.script.clone(),
        }
    }

    fn check_running(&self) -> EngineResult<()> {
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::new("mock engine not running"))
        }
    }
}

impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn init(&self) -> EngineResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::new("already running"));
        }
        Ok(())
    }

    fn quit(&self) -> EngineResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(EngineError::new("not running"));
        }
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn open_read(&self, path: &Path, _hints: &FormatHints) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        let (mut signal, data) = self
            .store
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| EngineError::new("no such file"))?;
        signal.length = if self.script.unknown_length {
            None
        } else {
            Some(data.len() as u64)
        };
        Ok(Box::new(self.stream(signal, data, None)))
    }

    fn open_mem_read(
        &self,
        data: Vec<u8>,
        hints: &FormatHints,
    ) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        if self.script.no_memory_streams {
            return Err(EngineError::new("memory streams unavailable"));
        }
        let signal = hints
            .signal
            .clone()
            .ok_or_else(|| EngineError::new("memory read needs a signal"))?;
        let samples: Vec<Sample> = data
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        self.counters.memory_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.stream(signal, samples, None)))
    }

    fn open_write(
        &self,
        path: &Path,
        signal: &SignalDescriptor,
        _encoding: Option<&EncodingDescriptor>,
        _file_type: Option<&str>,
    ) -> EngineResult<Box<dyn AudioStream>> {
        self.check_running()?;
        std::fs::File::create(path)?;
        let mut signal = signal.clone();
        signal.length = None;
        Ok(Box::new(self.stream(signal, Vec::new(), Some(path.to_path_buf()))))
    }

    fn effect_names(&self) -> Vec<String> {
        ["broken", "explode", "passthrough", "reject"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn create_effect(&self, name: &str) -> Option<Box<dyn Effect>> {
        let behavior = match name {
            "passthrough" => Behavior::Passthrough,
            "reject" => Behavior::Reject,
            "broken" => Behavior::BrokenConnect,
            "explode" => Behavior::Explode,
            _ => return None,
        };
        Some(Box::new(MockEffect {
            name: name.to_string(),
            behavior,
        }))
    }

    fn temp_path(&self, extension: &str) -> PathBuf {
        let n = self.counters.temp_serial.fetch_add(1, Ordering::SeqCst);
        self.temp_dir.join(format!("mock-{}.{}", n, extension))
    }

    fn supports_memory_streams(&self) -> bool {
        !self.script.no_memory_streams
    }
}

pub struct MockStream {
    signal: SignalDescriptor,
    encoding: EncodingDescriptor,
    data: Vec<Sample>,
    position: usize,
    sink: Option<PathBuf>,
    store: Store,
    counters: Arc<Counters>,
    script: MockScript,
}

impl AudioStream for MockStream {
    fn signal(&self) -> &SignalDescriptor {
        &self.signal
    }

    fn encoding(&self) -> &EncodingDescriptor {
        &self.encoding
    }

    fn seek(&mut self, offset: u64) -> EngineResult<()> {
        if self.script.seek_fails || offset > self.data.len() as u64 {
            return Err(EngineError::new("end of stream"));
        }
        self.position = offset as usize;
        Ok(())
    }

    fn read(&mut self, buf: &mut [Sample]) -> usize {
        let available = &self.data[self.position..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.position += count;
        count
    }

    fn write(&mut self, buf: &[Sample]) -> usize {
        let accepted = if self.script.short_write {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        self.data.extend_from_slice(&buf[..accepted]);
        accepted
    }

    fn close(self: Box<Self>) -> EngineResult<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        if self.script.close_fails && self.sink.is_some() {
            return Err(EngineError::new("could not finalize header"));
        }
        if let Some(path) = self.sink {
            let mut signal = self.signal;
            signal.length = Some(self.data.len() as u64);
            self.store.lock().unwrap().insert(path, (signal, self.data));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Passthrough,
    Reject,
    BrokenConnect,
    Explode,
}

struct MockEffect {
    name: String,
    behavior: Behavior,
}

impl Effect for MockEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, _args: &[String]) -> EngineResult<()> {
        match self.behavior {
            Behavior::Reject => Err(EngineError::new("options rejected")),
            _ => Ok(()),
        }
    }

    fn connect(
        &mut self,
        input: &SignalDescriptor,
        _target: &SignalDescriptor,
    ) -> EngineResult<SignalDescriptor> {
        match self.behavior {
            Behavior::BrokenConnect => Err(EngineError::new("cannot connect")),
            _ => Ok(input.clone()),
        }
    }

    fn process(&mut self, samples: Vec<Sample>) -> EngineResult<Vec<Sample>> {
        match self.behavior {
            Behavior::Explode => Err(EngineError::new("processing exploded")),
            _ => Ok(samples),
        }
    }
}

/// Files left anywhere under `dir`
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// A mono sine at `freq` Hz, `amplitude` in [0, 1]
pub fn sine(freq: f64, rate: f64, frames: usize, amplitude: f64) -> Vec<Sample> {
    (0..frames)
        .map(|i| {
            let t = i as f64 / rate;
            ((2.0 * std::f64::consts::PI * freq * t).sin() * amplitude * i32::MAX as f64) as Sample
        })
        .collect()
}
