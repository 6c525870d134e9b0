use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adapters::certs::bundle_loader;
use crate::core::errors::{CdocError, Result};
use crate::core::models::request::{ContainerVersion, EncryptionRequest, ServerData};

/// Settings read from a `--conf` TOML file.
///
/// Example:
/// ```toml
/// library = "/usr/lib/opensc-pkcs11.so"
/// version = 2
/// accept = ["ca-bundle.txt"]
///
/// [[servers]]
/// id = "ks1"
/// url = "https://keyserver.example:8443"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    /// Accepted issuer certificate files, relative to the config file.
    #[serde(default)]
    pub accept: Vec<PathBuf>,
    pub version: Option<u8>,
    pub genlabel: Option<bool>,
    pub out: Option<PathBuf>,
}

/// A `[[servers]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    pub id: String,
    pub url: String,
}

impl ToolConfig {
    /// Load and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CdocError::InvalidConfig {
            detail: format!("Failed to read {}: {e}", path.display()),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| CdocError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })?;

        if let Some(v) = config.version {
            if ContainerVersion::from_number(v).is_none() {
                return Err(CdocError::InvalidConfig {
                    detail: format!("Unsupported container version {v} (expected 1 or 2)"),
                });
            }
        }

        Ok(config)
    }

    /// Apply these settings on top of `request`.
    ///
    /// `base_dir` is the directory holding the config file; relative
    /// `accept` paths are resolved against it.
    pub fn apply(&self, request: &mut EncryptionRequest, base_dir: &Path) -> Result<()> {
        if let Some(library) = &self.library {
            request.library = Some(library.clone());
        }

        request
            .servers
            .extend(self.servers.iter().map(|s| ServerData {
                id: s.id.clone(),
                url: s.url.clone(),
            }));

        for file in &self.accept {
            let path = base_dir.join(file);
            request
                .accept_certs
                .extend(bundle_loader::load_certificates(&path)?);
        }

        if let Some(version) = self.version.and_then(ContainerVersion::from_number) {
            request.container_version = version;
        }
        if let Some(genlabel) = self.genlabel {
            request.generate_label = genlabel;
        }
        if let Some(out) = &self.out {
            request.output_path = Some(out.clone());
        }

        Ok(())
    }
}

/// Read the config file at `path` and apply it to `request`.
pub fn apply_file(path: &Path, request: &mut EncryptionRequest) -> Result<()> {
    let config = ToolConfig::load(path)?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    config.apply(request, base_dir)
}
