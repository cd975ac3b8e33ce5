//! Filesystem drivers for the two toolchain stages.
//!
//! The library layer stays silent; these drivers read sources, render any
//! diagnostics against them, and write the outputs next to the inputs. A
//! failure in file N of a directory run leaves the first N-1 outputs in
//! place and reports the failure to the caller.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::diagnostic::render_diagnostics;
use crate::lower::HackLowering;
use crate::vm;

#[derive(Debug)]
pub enum PipelineError {
    Io { path: PathBuf, source: io::Error },
    /// Diagnostics were already rendered against the named file.
    Source { path: PathBuf },
    BadInput { path: PathBuf, expected: &'static str },
    NoInputs { path: PathBuf, extension: &'static str },
    OutputWithDirectory,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io { path, source } => {
                write!(f, "cannot access '{}': {}", path.display(), source)
            }
            PipelineError::Source { path } => {
                write!(f, "aborting due to previous errors in '{}'", path.display())
            }
            PipelineError::BadInput { path, expected } => {
                write!(f, "'{}' is not {}", path.display(), expected)
            }
            PipelineError::NoInputs { path, extension } => {
                write!(f, "no .{} files found in '{}'", extension, path.display())
            }
            PipelineError::OutputWithDirectory => {
                write!(f, "--output cannot be combined with a directory input")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

// ─── Stage one: .jack → .vm ───────────────────────────────────────

/// Compile a `.jack` file, or every `.jack` file in a directory. Each output
/// `.vm` lands next to its source. Returns the written paths.
pub fn compile_path(input: &Path, output: Option<&Path>) -> Result<Vec<PathBuf>, PipelineError> {
    if input.is_dir() {
        if output.is_some() {
            return Err(PipelineError::OutputWithDirectory);
        }
        let files = sources_in(input, "jack")?;
        let mut outputs = Vec::new();
        for file in files {
            outputs.push(compile_file(&file, None)?);
        }
        Ok(outputs)
    } else {
        Ok(vec![compile_file(input, output)?])
    }
}

fn compile_file(input: &Path, output: Option<&Path>) -> Result<PathBuf, PipelineError> {
    if !has_extension(input, "jack") {
        return Err(PipelineError::BadInput {
            path: input.to_path_buf(),
            expected: "a .jack file or a directory",
        });
    }
    let source = read(input)?;

    let vm_text = match crate::compile_source(&source) {
        Ok(text) => text,
        Err(diagnostics) => {
            render_diagnostics(&diagnostics, &input.display().to_string(), &source);
            return Err(PipelineError::Source {
                path: input.to_path_buf(),
            });
        }
    };

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("vm"),
    };
    write(&out_path, &vm_text)?;
    Ok(out_path)
}

// ─── Stage two: .vm → .asm ────────────────────────────────────────

/// Translate a `.vm` file (no bootstrap) or a directory of `.vm` files
/// (bootstrap prepended) into one `.asm`. Directory mode writes
/// `<dir>/<dir-basename>.asm`. Returns the written path.
pub fn translate_path(input: &Path, output: Option<&Path>) -> Result<PathBuf, PipelineError> {
    let (files, bootstrap, default_output) = if input.is_dir() {
        let files = sources_in(input, "vm")?;
        let default = input.join(format!("{}.asm", dir_basename(input)));
        (files, true, default)
    } else {
        if !has_extension(input, "vm") {
            return Err(PipelineError::BadInput {
                path: input.to_path_buf(),
                expected: "a .vm file or a directory",
            });
        }
        (vec![input.to_path_buf()], false, input.with_extension("asm"))
    };

    let mut lowering = HackLowering::new();
    let mut lines = Vec::new();
    if bootstrap {
        lowering.emit_bootstrap(&mut lines);
    }

    for file in &files {
        let source = read(file)?;
        let (ops, diagnostics) = vm::parse_source(&source);
        if !diagnostics.is_empty() {
            render_diagnostics(&diagnostics, &file.display().to_string(), &source);
            return Err(PipelineError::Source { path: file.clone() });
        }
        let basename = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        lowering.lower_file(&basename, &ops, &mut lines);
    }

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output,
    };
    let mut text = lines.join("\n");
    text.push('\n');
    write(&out_path, &text)?;
    Ok(out_path)
}

// ─── Helpers ──────────────────────────────────────────────────────

/// Non-recursive listing of `*.ext` files, sorted by name so multi-file
/// output is deterministic regardless of directory order.
fn sources_in(dir: &Path, extension: &'static str) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(PipelineError::NoInputs {
            path: dir.to_path_buf(),
            extension,
        });
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}

/// Basename the output `.asm` is named after. Falls back through
/// canonicalization for inputs like `.`.
fn dir_basename(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            dir.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "out".to_string())
}

fn read(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, text: &str) -> Result<(), PipelineError> {
    fs::write(path, text).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
