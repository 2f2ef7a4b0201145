//! Where template configuration comes from.
//!
//! The store only sees a [`TemplateSource`]; the process wires in a
//! [`FileTemplateSource`] that probes a list of candidate paths, tests use
//! [`InlineTemplateSource`].

use super::template::TemplateConfig;
use crate::error::{ProxyError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Relative location of the shipped template file.
pub const TEMPLATES_FILE: &str = "src/domains/templates.json";

/// Provider of template configuration, queried once at startup.
pub trait TemplateSource: Send + Sync {
    /// Produce the configuration.
    ///
    /// # Errors
    /// [`ProxyError::ConfigLoad`] when no configuration can be produced.
    fn load(&self) -> Result<TemplateConfig>;
}

/// Configuration held in memory.
#[derive(Debug, Clone, Default)]
pub struct InlineTemplateSource(pub TemplateConfig);

impl TemplateSource for InlineTemplateSource {
    fn load(&self) -> Result<TemplateConfig> {
        Ok(self.0.clone())
    }
}

/// JSON template file found by probing candidate paths in order.
#[derive(Debug, Clone)]
pub struct FileTemplateSource {
    candidates: Vec<PathBuf>,
}

impl FileTemplateSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Probe `explicit` first (when given), then the standard locations
    /// relative to the working directory and the executable.
    pub fn with_default_candidates(explicit: Option<PathBuf>) -> Self {
        let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();
        candidates.push(PathBuf::from(TEMPLATES_FILE));

        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(exe_dir.join(TEMPLATES_FILE));
        }

        candidates.push(PathBuf::from("..").join(TEMPLATES_FILE));
        candidates.push(PathBuf::from("domains/templates.json"));
        candidates.push(PathBuf::from("templates.json"));

        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl TemplateSource for FileTemplateSource {
    /// First candidate that can be both read and parsed wins.
    fn load(&self) -> Result<TemplateConfig> {
        let mut attempts = Vec::with_capacity(self.candidates.len());

        for path in &self.candidates {
            match read_config(path) {
                Ok(config) => {
                    info!("Loaded domain templates from: {}", path.display());
                    return Ok(config);
                }
                Err(reason) => {
                    debug!("Template candidate {} rejected: {}", path.display(), reason);
                    attempts.push(format!("{}: {}", path.display(), reason));
                }
            }
        }

        if attempts.is_empty() {
            return Err(ProxyError::ConfigLoad(
                "no candidate template paths configured".to_string(),
            ));
        }

        Err(ProxyError::ConfigLoad(attempts.join("; ")))
    }
}

fn read_config(path: &Path) -> std::result::Result<TemplateConfig, String> {
    let data = fs::read_to_string(path).map_err(|e| format!("unreadable ({})", e))?;
    serde_json::from_str(&data).map_err(|e| format!("unparseable ({})", e))
}
