use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;
use txt2vcf_config::AppConfig;
use txt2vcf_convert::{
    AllOf, BatchConfig, ConvertError, Converter, MarkerFileGate, RemotePolicyGate,
};

pub const GATE_WARNING: &str =
    "WARNING! You are attempting to run this program in a machine that the program was not designed for!";

#[derive(Debug, Default, Args)]
pub struct ConvertArgs {
    /// Directory of text files to read (overrides TXT_DIR)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,
    /// Directory to write .vcf files into (overrides VCF_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub fn convert(ctx: &Context<'_>, args: ConvertArgs) -> Result<()> {
    let batch = BatchConfig {
        input_dir: args
            .input_dir
            .unwrap_or_else(|| ctx.config.txt_dir.clone()),
        output_dir: args
            .output_dir
            .unwrap_or_else(|| ctx.config.vcf_dir.clone()),
    };
    if batch.input_dir.as_os_str().is_empty() {
        return Err(invalid_input("input directory cannot be empty"));
    }
    if batch.output_dir.as_os_str().is_empty() {
        return Err(invalid_input("output directory cannot be empty"));
    }
    debug!(
        input = %batch.input_dir.display(),
        output = %batch.output_dir.display(),
        "batch configured"
    );

    let converter = Converter::new(batch, build_gate(ctx.config));
    let summary = match converter.run_with(|file| {
        if !ctx.json {
            println!("VCF file from {} created successfully.", file.input);
        }
    }) {
        Ok(summary) => summary,
        Err(ConvertError::GateDenied) => {
            eprintln!("{GATE_WARNING}");
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!(
                    "convert {} into {}",
                    converter.config().input_dir.display(),
                    converter.config().output_dir.display()
                )
            });
        }
    };

    if ctx.json {
        return print_json(&summary);
    }

    println!(
        "Number of txt files converted to vcf: {}",
        summary.files_converted
    );
    println!(
        "Total number of contacts in each vcf file: {}",
        summary.total_contacts
    );
    Ok(())
}

fn build_gate(config: &AppConfig) -> AllOf {
    let gate = AllOf::new().with(MarkerFileGate::new(&config.run_file_path));
    match &config.policy {
        Some(policy) => gate.with(RemotePolicyGate::new(
            policy.url.clone(),
            &policy.approved_marker_path,
        )),
        None => gate,
    }
}
