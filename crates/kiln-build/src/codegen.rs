//! Generated sources for each project
//!
//! Three files are written into the project's `obj/` directory before it is
//! compiled:
//! - `__meta.h`: project id, kind and build date as preprocessor constants
//! - `__assets.h`: extern declarations for every embedded asset
//! - `__assets.s`: NASM source embedding each asset with `incbin`
//!
//! Rendering is pure; [`Codegen::generate`] performs the writes.

use crate::error::{BuildError, BuildResult};
use crate::project::Project;
use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const META_HEADER: &str = "__meta.h";
pub const ASSETS_HEADER: &str = "__assets.h";
pub const ASSETS_SOURCE: &str = "__assets.s";

const GENERATED_NOTICE: &str = "This file is auto generated.";

/// Symbol prefix for an asset: `__<project>_<file>` with every `.` replaced by `_`
pub fn asset_symbol(project_id: &str, file_name: &str) -> String {
    format!("__{}_{}", project_id, file_name).replace('.', "_")
}

/// Paths of the files written by one generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub meta_header: PathBuf,
    pub assets_header: PathBuf,
    pub assets_source: PathBuf,
    /// Asset file names embedded, sorted
    pub assets: Vec<String>,
}

/// Writes generated files; the build date defaults to the local time of each pass
#[derive(Debug, Clone, Default)]
pub struct Codegen {
    build_date: Option<String>,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed build date instead of the current time
    pub fn with_build_date(mut self, build_date: impl Into<String>) -> Self {
        self.build_date = Some(build_date.into());
        self
    }

    /// Generate all three files for `project`
    pub fn generate(&self, project: &Project) -> BuildResult<GeneratedFiles> {
        let obj = &project.paths.obj;
        fs::create_dir_all(obj).map_err(|e| BuildError::io(obj, e))?;

        let assets = list_assets(&project.paths.assets)?;
        let build_date = self
            .build_date
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string());

        let files = GeneratedFiles {
            meta_header: obj.join(META_HEADER),
            assets_header: obj.join(ASSETS_HEADER),
            assets_source: obj.join(ASSETS_SOURCE),
            assets,
        };

        write_file(&files.meta_header, &render_meta_header(project, &build_date))?;
        write_file(
            &files.assets_header,
            &render_assets_header(project, &files.assets),
        )?;
        write_file(
            &files.assets_source,
            &render_assets_source(project, &files.assets),
        )?;

        tracing::debug!(
            project = %project.id,
            assets = files.assets.len(),
            "generated meta and asset files"
        );

        Ok(files)
    }
}

fn write_file(path: &Path, content: &str) -> BuildResult<()> {
    fs::write(path, content).map_err(|e| BuildError::io(path, e))
}

/// File names directly inside the assets directory, sorted; empty when missing
///
/// Names that are not valid UTF-8 cannot be turned into symbols and are
/// skipped with a warning.
pub fn list_assets(dir: &Path) -> BuildResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => assets.push(name.to_string()),
            None => tracing::warn!(
                path = %entry.path().display(),
                "skipping asset with a non UTF-8 file name"
            ),
        }
    }
    Ok(assets)
}

pub fn render_meta_header(project: &Project, build_date: &str) -> String {
    let mut out = String::new();
    out.push_str("#pragma once\n");
    let _ = writeln!(out, "// {}\n", GENERATED_NOTICE);
    let _ = writeln!(out, "#define __PROJECT_ID \"{}\"", project.id);
    let _ = writeln!(out, "#define __PROJECT_TYPE \"{}\"", project.kind.name());
    let _ = writeln!(out, "#define __PROJECT_BUILD_DATE \"{}\"", build_date);
    out
}

pub fn render_assets_header(project: &Project, assets: &[String]) -> String {
    let mut out = String::new();
    out.push_str("#pragma once\n");
    let _ = writeln!(out, "// {}", GENERATED_NOTICE);

    for asset in assets {
        let name = asset_symbol(&project.id, asset);
        out.push('\n');
        let _ = writeln!(out, "extern const char {}_start;", name);
        let _ = writeln!(out, "extern const char {}_end;", name);
        let _ = writeln!(out, "extern const int {}_size;", name);
    }

    out
}

pub fn render_assets_source(project: &Project, assets: &[String]) -> String {
    let mut out = String::new();
    out.push_str("bits 32\n");
    out.push_str("section .rodata\n");
    let _ = writeln!(out, ";; {}", GENERATED_NOTICE);
    out.push_str("global __assets_start\n");
    out.push_str("__assets_start:\n");

    for asset in assets {
        let name = asset_symbol(&project.id, asset);
        let path = project.paths.assets.join(asset);

        out.push('\n');
        let _ = writeln!(out, "global {}_start", name);
        let _ = writeln!(out, "global {}_end", name);
        let _ = writeln!(out, "global {}_size", name);
        out.push('\n');
        let _ = writeln!(out, "{}_start:   incbin \"{}\"", name, path.display());
        let _ = writeln!(out, "{}_end:", name);
        let _ = writeln!(out, "{}_size:    dd $-{}_start", name, name);
    }

    out.push_str("global __assets_end\n");
    out.push_str("__assets_end:\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_asset_symbol() {
        assert_eq!(asset_symbol("myproj", "font.bin"), "__myproj_font_bin");
        assert_eq!(asset_symbol("libc", "a.b.c"), "__libc_a_b_c");
        assert_eq!(asset_symbol("my.proj", "logo"), "__my_proj_logo");
    }

    #[test]
    fn test_meta_header() {
        let project = Project::new("kernel", ProjectKind::Kernel, "/ws/kernel");
        let header = render_meta_header(&project, "2026-01-02 03:04:05");

        assert_eq!(
            header,
            "#pragma once\n\
             // This file is auto generated.\n\
             \n\
             #define __PROJECT_ID \"kernel\"\n\
             #define __PROJECT_TYPE \"kernel\"\n\
             #define __PROJECT_BUILD_DATE \"2026-01-02 03:04:05\"\n"
        );
    }

    #[test]
    fn test_assets_header() {
        let project = Project::new("myproj", ProjectKind::Application, "/ws/myproj");
        let header = render_assets_header(&project, &["font.bin".to_string()]);

        assert_eq!(
            header,
            "#pragma once\n\
             // This file is auto generated.\n\
             \n\
             extern const char __myproj_font_bin_start;\n\
             extern const char __myproj_font_bin_end;\n\
             extern const int __myproj_font_bin_size;\n"
        );
    }

    #[test]
    fn test_assets_source_without_assets_has_markers() {
        let project = Project::new("libc", ProjectKind::Library, "/ws/libc");
        let source = render_assets_source(&project, &[]);

        assert_eq!(
            source,
            "bits 32\n\
             section .rodata\n\
             ;; This file is auto generated.\n\
             global __assets_start\n\
             __assets_start:\n\
             global __assets_end\n\
             __assets_end:\n"
        );
    }

    #[test]
    fn test_assets_source_embeds_each_asset() {
        let project = Project::new("myproj", ProjectKind::Application, "/ws/myproj");
        let source = render_assets_source(&project, &["font.bin".to_string()]);

        assert!(source.contains("global __myproj_font_bin_start\n"));
        assert!(source.contains("global __myproj_font_bin_end\n"));
        assert!(source.contains("global __myproj_font_bin_size\n"));
        assert!(source.contains(&format!(
            "__myproj_font_bin_start:   incbin \"{}\"\n",
            Path::new("/ws/myproj/assets/font.bin").display()
        )));
        assert!(source.contains("__myproj_font_bin_size:    dd $-__myproj_font_bin_start\n"));

        let start = source.find("__assets_start:").unwrap();
        let asset = source.find("incbin").unwrap();
        let end = source.find("__assets_end:").unwrap();
        assert!(start < asset && asset < end);
    }

    #[test]
    fn test_generate_writes_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("myproj");
        fs::create_dir_all(root.join("assets/nested")).unwrap();
        fs::write(root.join("assets/font.bin"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("assets/cursor.png"), [0u8]).unwrap();

        let project = Project::new("myproj", ProjectKind::Application, &root);
        let files = Codegen::new()
            .with_build_date("today")
            .generate(&project)
            .unwrap();

        assert_eq!(files.assets, vec!["cursor.png", "font.bin"]);
        assert_eq!(files.meta_header, root.join("obj/__meta.h"));

        let meta = fs::read_to_string(&files.meta_header).unwrap();
        assert!(meta.contains("#define __PROJECT_TYPE \"app\""));
        assert!(meta.contains("#define __PROJECT_BUILD_DATE \"today\""));

        let header = fs::read_to_string(&files.assets_header).unwrap();
        assert!(header.contains("extern const int __myproj_font_bin_size;"));
        assert!(header.contains("extern const char __myproj_cursor_png_start;"));

        assert!(files.assets_source.is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_list_assets_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let assets = temp_dir.path().join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("font.bin"), [0u8]).unwrap();
        fs::write(assets.join(OsStr::from_bytes(b"bad\xff.bin")), [0u8]).unwrap();

        assert_eq!(list_assets(&assets).unwrap(), vec!["font.bin"]);
    }

    #[test]
    fn test_generate_without_assets_dir() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::new("libc", ProjectKind::Library, temp_dir.path());

        let files = Codegen::new().generate(&project).unwrap();

        assert!(files.assets.is_empty());
        let meta = fs::read_to_string(&files.meta_header).unwrap();
        assert!(meta.contains("#define __PROJECT_BUILD_DATE \""));
    }
}
