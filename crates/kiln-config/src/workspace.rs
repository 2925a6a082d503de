//! Workspace Configuration (kiln.toml)
//!
//! Handles workspace-level configuration stored in `kiln.toml` at the
//! workspace root. Every section is optional; missing keys fall back to
//! the defaults below.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace configuration from kiln.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Project discovery settings
    pub projects: ProjectsConfig,

    /// External tool programs and flags
    pub toolchain: ToolchainConfig,

    /// Linker scripts
    pub link: LinkConfig,
}

/// Project discovery settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectsConfig {
    /// Directories (relative to the workspace root) scanned for manifests
    pub search: Vec<PathBuf>,

    /// Manifest file name
    pub manifest: String,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            search: vec![PathBuf::from(".")],
            manifest: "manifest.json".to_string(),
        }
    }
}

/// External tool programs and their fixed flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// C compiler
    pub cc: String,
    pub cflags: Vec<String>,

    /// Assembler
    pub assembler: String,
    pub asflags: Vec<String>,

    /// Linker
    pub ld: String,
    pub ldflags: Vec<String>,

    /// Archiver
    pub ar: String,
    pub arflags: Vec<String>,

    /// Disassembler
    pub objdump: String,
    pub objdump_flags: Vec<String>,

    /// Extra compiler flags for projects built in strict mode
    pub strict_flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cc: "i686-elf-gcc".to_string(),
            cflags: to_strings(&[
                "-std=gnu11",
                "-MD",
                "-O2",
                "-ffreestanding",
                "-nostdlib",
                "-nostdinc",
                "-fno-pie",
                "-Wall",
                "-Wextra",
            ]),
            assembler: "nasm".to_string(),
            asflags: to_strings(&["-f", "elf32"]),
            ld: "i686-elf-ld".to_string(),
            ldflags: Vec::new(),
            ar: "i686-elf-ar".to_string(),
            arflags: to_strings(&["rcs"]),
            objdump: "i686-elf-objdump".to_string(),
            objdump_flags: to_strings(&["-Mintel", "-S"]),
            strict_flags: to_strings(&["-Werror"]),
        }
    }
}

/// Linker scripts, relative to the workspace root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Script used to link applications
    pub application_script: PathBuf,

    /// Script used to link the kernel image
    pub kernel_script: PathBuf,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            application_script: PathBuf::from("common/userspace.ld"),
            kernel_script: PathBuf::from("common/kernel.ld"),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl WorkspaceConfig {
    /// Load workspace configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the workspace configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.projects.search.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "projects.search".to_string(),
                reason: "at least one search directory is required".to_string(),
            });
        }

        if self.projects.manifest.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "projects.manifest".to_string(),
                reason: "manifest file name cannot be empty".to_string(),
            });
        }

        let programs = [
            ("toolchain.cc", &self.toolchain.cc),
            ("toolchain.assembler", &self.toolchain.assembler),
            ("toolchain.ld", &self.toolchain.ld),
            ("toolchain.ar", &self.toolchain.ar),
            ("toolchain.objdump", &self.toolchain.objdump),
        ];
        for (field, program) in programs {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "program cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}
