use crate::error::{ConvertError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Content the run file must hold, after trimming, for a run to proceed.
pub const RUN_MARKER_VALUE: &str = "True";

/// Decides whether a conversion run may start on this machine.
pub trait RunGate {
    fn is_authorized(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAllow;

impl RunGate for AlwaysAllow {
    fn is_authorized(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Local run file check. A missing file denies the run.
#[derive(Debug, Clone)]
pub struct MarkerFileGate {
    path: PathBuf,
}

impl MarkerFileGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RunGate for MarkerFileGate {
    fn is_authorized(&self) -> Result<bool> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.trim() == RUN_MARKER_VALUE),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "run file missing");
                Ok(false)
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => Ok(false),
            Err(err) => Err(ConvertError::io(&self.path, err)),
        }
    }
}

/// Passes only if every gate passes; stops at the first denial or error.
#[derive(Default)]
pub struct AllOf {
    gates: Vec<Box<dyn RunGate>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gate: impl RunGate + 'static) -> Self {
        self.gates.push(Box::new(gate));
        self
    }
}

impl RunGate for AllOf {
    fn is_authorized(&self) -> Result<bool> {
        for gate in &self.gates {
            if !gate.is_authorized()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
