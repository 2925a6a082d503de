//! Toolchain capability: the external programs the orchestrator drives
//!
//! The orchestrator only talks to the [`Toolchain`] trait. [`CommandToolchain`]
//! runs the programs named in `kiln.toml`; tests substitute a recording fake.

use crate::error::{BuildError, BuildResult};
use kiln_config::ToolchainConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Operations the build needs from a native toolchain
pub trait Toolchain {
    /// Compile a C unit into an object
    fn compile(
        &self,
        source: &Path,
        object: &Path,
        include_paths: &[PathBuf],
        defines: &[String],
        strict: bool,
    ) -> BuildResult<()>;

    /// Assemble an assembly unit into an object
    fn assemble(&self, source: &Path, object: &Path) -> BuildResult<()>;

    /// Bundle objects into a static archive
    fn archive(&self, objects: &[PathBuf], output: &Path) -> BuildResult<()>;

    /// Link objects and archives into an executable image
    fn link(
        &self,
        objects: &[PathBuf],
        libraries: &[PathBuf],
        output: &Path,
        link_script: &Path,
    ) -> BuildResult<()>;

    /// Write a disassembly listing of `binary` to `output`
    fn disassemble(&self, binary: &Path, output: &Path) -> BuildResult<()>;

    /// Create a directory and its parents; existing directories are fine
    fn make_directory(&self, path: &Path) -> BuildResult<()> {
        fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))
    }

    /// Remove a directory tree; a missing directory is fine
    fn remove_directory_tree(&self, path: &Path) -> BuildResult<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::io(path, e)),
        }
    }
}

/// Toolchain that spawns the configured programs
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    config: ToolchainConfig,
}

impl CommandToolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Arguments passed to the compiler for one unit
    pub fn compile_args(
        &self,
        source: &Path,
        object: &Path,
        include_paths: &[PathBuf],
        defines: &[String],
        strict: bool,
    ) -> Vec<String> {
        let mut args = self.config.cflags.clone();
        if strict {
            args.extend(self.config.strict_flags.iter().cloned());
        }
        args.extend(include_paths.iter().map(|path| format!("-I{}", path.display())));
        args.extend(defines.iter().map(|define| format!("-D{}", define)));
        args.push("-c".to_string());
        args.push(display(source));
        args.push("-o".to_string());
        args.push(display(object));
        args
    }

    /// Arguments passed to the linker
    pub fn link_args(
        &self,
        objects: &[PathBuf],
        libraries: &[PathBuf],
        output: &Path,
        link_script: &Path,
    ) -> Vec<String> {
        let mut args = self.config.ldflags.clone();
        args.push("-T".to_string());
        args.push(display(link_script));
        args.push("-o".to_string());
        args.push(display(output));
        args.extend(objects.iter().map(|path| display(path)));
        args.extend(libraries.iter().map(|path| display(path)));
        args
    }

    fn run(&self, program: &str, args: &[String]) -> BuildResult<Vec<u8>> {
        tracing::debug!(tool = program, args = %args.join(" "), "running tool");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BuildError::ToolSpawn {
                tool: program.to_string(),
                error: e,
            })?
            .wait_with_output()
            .map_err(|e| BuildError::ToolSpawn {
                tool: program.to_string(),
                error: e,
            })?;

        if !output.status.success() {
            return Err(BuildError::ToolFailed {
                tool: program.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::warn!(tool = program, "{}", stderr.trim());
        }

        Ok(output.stdout)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

impl Toolchain for CommandToolchain {
    fn compile(
        &self,
        source: &Path,
        object: &Path,
        include_paths: &[PathBuf],
        defines: &[String],
        strict: bool,
    ) -> BuildResult<()> {
        let args = self.compile_args(source, object, include_paths, defines, strict);
        self.run(&self.config.cc, &args).map(drop)
    }

    fn assemble(&self, source: &Path, object: &Path) -> BuildResult<()> {
        let mut args = self.config.asflags.clone();
        args.push(display(source));
        args.push("-o".to_string());
        args.push(display(object));
        self.run(&self.config.assembler, &args).map(drop)
    }

    fn archive(&self, objects: &[PathBuf], output: &Path) -> BuildResult<()> {
        let mut args = self.config.arflags.clone();
        args.push(display(output));
        args.extend(objects.iter().map(|path| display(path)));
        self.run(&self.config.ar, &args).map(drop)
    }

    fn link(
        &self,
        objects: &[PathBuf],
        libraries: &[PathBuf],
        output: &Path,
        link_script: &Path,
    ) -> BuildResult<()> {
        let args = self.link_args(objects, libraries, output, link_script);
        self.run(&self.config.ld, &args).map(drop)
    }

    fn disassemble(&self, binary: &Path, output: &Path) -> BuildResult<()> {
        let mut args = self.config.objdump_flags.clone();
        args.push(display(binary));
        let listing = self.run(&self.config.objdump, &args)?;
        fs::write(output, listing).map_err(|e| BuildError::io(output, e))
    }
}
