//! Environment struct (stdin tty detection, colors, config location)

use std::path::PathBuf;

/// Overrides the config directory, mainly for tests
pub const CONFIG_DIR_ENV: &str = "CURLSHARP_CONFIG_DIR";

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdin_isatty: bool,
    /// Warnings on stderr may be colored
    pub colors: bool,
    pub program_name: String,
    pub config_dir: PathBuf,
}

impl Environment {
    pub fn init() -> Self {
        Self::default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            stdin_isatty: atty::is(atty::Stream::Stdin),
            colors: detect_color_support(),
            program_name: env!("CARGO_PKG_NAME").to_string(),
            config_dir: default_config_dir(),
        }
    }
}

/// `$CURLSHARP_CONFIG_DIR`, else the platform config dir, else `.curlsharp`
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::config_dir()
        .map(|p| p.join("curlsharp"))
        .unwrap_or_else(|| PathBuf::from(".curlsharp"))
}

fn detect_color_support() -> bool {
    if !atty::is(atty::Stream::Stderr) {
        return false;
    }

    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}
