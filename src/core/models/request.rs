use std::fmt;
use std::path::PathBuf;

/// CDOC container format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerVersion {
    /// CDOC 1.0, certificate recipients only.
    #[default]
    V1,
    /// CDOC 2.0.
    V2,
}

impl ContainerVersion {
    pub fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDOC {}", self.number())
    }
}

/// A remote key-agreement server given with `--server ID URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerData {
    pub id: String,
    pub url: String,
}

/// Everything the engine needs besides the recipients.
///
/// Built incrementally while the arguments are walked, then validated
/// once and handed over by value.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionRequest {
    pub library: Option<PathBuf>,
    pub servers: Vec<ServerData>,
    pub accept_certs: Vec<Vec<u8>>,
    pub container_version: ContainerVersion,
    pub generate_label: bool,
    pub input_files: Vec<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Default for EncryptionRequest {
    /// Version 1 with label generation on, so the user does not have
    /// to type `-v1 --genlabel`.
    fn default() -> Self {
        Self {
            library: None,
            servers: Vec::new(),
            accept_certs: Vec::new(),
            container_version: ContainerVersion::V1,
            generate_label: true,
            input_files: Vec::new(),
            output_path: None,
        }
    }
}

impl EncryptionRequest {
    /// Library path, treating an empty path as absent.
    pub fn library(&self) -> Option<&PathBuf> {
        self.library.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Output path, treating an empty path as absent.
    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
