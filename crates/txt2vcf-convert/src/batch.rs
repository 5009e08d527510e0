use crate::error::{ConvertError, Result};
use crate::gate::RunGate;
use crate::vcf::{serialize_cards, VCF_EXTENSION};
use serde::Serialize;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use txt2vcf_core::{build_contacts, extract_phone_numbers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files_converted: usize,
    pub total_contacts: usize,
    pub files: Vec<ConvertedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedFile {
    pub input: String,
    pub output: PathBuf,
    pub contacts: usize,
}

impl BatchSummary {
    fn record(&mut self, file: ConvertedFile) {
        self.files_converted += 1;
        self.total_contacts += file.contacts;
        self.files.push(file);
    }
}

/// Converts every file in the input directory into a `.vcf` file of the same
/// base name in the output directory, in sorted-name order.
pub struct Converter<G> {
    config: BatchConfig,
    gate: G,
}

impl<G: RunGate> Converter<G> {
    pub fn new(config: BatchConfig, gate: G) -> Self {
        Self { config, gate }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs the whole batch. The first failing file aborts the run; outputs
    /// written before it are kept.
    pub fn run(&self) -> Result<BatchSummary> {
        self.run_with(|_| {})
    }

    /// Like [`Converter::run`], calling `on_file` as soon as each output file
    /// has been written.
    pub fn run_with<F>(&self, mut on_file: F) -> Result<BatchSummary>
    where
        F: FnMut(&ConvertedFile),
    {
        ensure_dir(&self.config.input_dir)?;
        ensure_dir(&self.config.output_dir)?;

        if !self.gate.is_authorized()? {
            info!("run gate denied; nothing converted");
            return Err(ConvertError::GateDenied);
        }

        let inputs = list_inputs(&self.config.input_dir)?;
        debug!(
            dir = %self.config.input_dir.display(),
            files = ?inputs.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            "input files listed"
        );

        let mut summary = BatchSummary::default();
        for (name, path) in inputs {
            let converted = self.convert_file(&name, &path)?;
            on_file(&converted);
            summary.record(converted);
        }

        info!(
            files_converted = summary.files_converted,
            total_contacts = summary.total_contacts,
            "batch finished"
        );
        Ok(summary)
    }

    fn convert_file(&self, name: &OsStr, path: &Path) -> Result<ConvertedFile> {
        let bytes = fs::read(path).map_err(|err| ConvertError::io(path, err))?;
        let text = String::from_utf8(bytes).map_err(|_| ConvertError::Decode {
            path: path.to_path_buf(),
        })?;
        let text = normalize_line_endings(&text);

        let stem = base_name(name);
        let numbers = extract_phone_numbers(&text);
        let contacts = build_contacts(&stem.to_string_lossy(), &numbers);
        let body = serialize_cards(&contacts);

        let mut file_name = stem;
        file_name.push(".");
        file_name.push(VCF_EXTENSION);
        let output = self.config.output_dir.join(file_name);
        fs::write(&output, body).map_err(|err| ConvertError::io(&output, err))?;

        debug!(
            input = %path.display(),
            output = %output.display(),
            contacts = contacts.len(),
            "file converted"
        );
        Ok(ConvertedFile {
            input: name.to_string_lossy().into_owned(),
            output,
            contacts: contacts.len(),
        })
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| ConvertError::io(dir, err))
}

fn list_inputs(dir: &Path) -> Result<Vec<(OsString, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| ConvertError::io(dir, err))? {
        let entry = entry.map_err(|err| ConvertError::io(dir, err))?;
        entries.push((entry.file_name(), entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Text-mode newline handling: `\r\n` and lone `\r` both become `\n`.
fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// File name with its last extension removed; dot-files keep their name.
fn base_name(name: &OsStr) -> OsString {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| name.to_os_string())
}
