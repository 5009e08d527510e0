use anyhow::Error;
use std::process::ExitCode;
use thiserror::Error as ThisError;
use txt2vcf_config::ConfigError;
use txt2vcf_convert::ConvertError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_NETWORK: u8 = 4;

const BUG_REPORT: [&str; 4] = [
    "Please send the following information to the developer:",
    "1. The exact error message above",
    "2. The contents of your configuration (without sensitive information)",
    "3. The operating system you're using",
];

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }

    if is_usage_error(err) {
        return;
    }
    for line in BUG_REPORT {
        eprintln!("{line}");
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
            });
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(convert_err) = cause.downcast_ref::<ConvertError>() {
            return ExitCode::from(convert_exit_code(convert_err));
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn is_usage_error(err: &Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<CliError>().is_some())
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::EmptyPolicyUrl
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. }
        | ConfigError::Dotenv { .. } => EXIT_INVALID_INPUT,
    }
}

fn convert_exit_code(err: &ConvertError) -> u8 {
    match err {
        ConvertError::GateDenied => 0,
        ConvertError::NetworkUnavailable(_) => EXIT_NETWORK,
        ConvertError::Decode { .. } => EXIT_INVALID_INPUT,
        ConvertError::Io { .. } => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::path::PathBuf;

    fn code(err: &Error) -> String {
        format!("{:?}", exit_code_for(err))
    }

    #[test]
    fn exit_codes_follow_error_chain() {
        let decode: Error = Err::<(), _>(ConvertError::Decode {
            path: PathBuf::from("b.txt"),
        })
        .context("convert batch")
        .unwrap_err();
        assert_eq!(code(&decode), format!("{:?}", ExitCode::from(EXIT_INVALID_INPUT)));

        let network = Error::from(ConvertError::NetworkUnavailable("timeout".to_string()));
        assert_eq!(code(&network), format!("{:?}", ExitCode::from(EXIT_NETWORK)));

        let other = anyhow::anyhow!("stdout closed");
        assert_eq!(code(&other), format!("{:?}", ExitCode::from(EXIT_FAILURE)));
    }

    #[test]
    fn usage_errors_are_detected() {
        assert!(is_usage_error(&invalid_input("bad dir")));
        assert!(!is_usage_error(&anyhow::anyhow!("boom")));
    }
}
