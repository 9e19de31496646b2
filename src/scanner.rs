use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for collecting handler source files.
///
/// Each input may be a single `.rs` file or a directory, which is walked
/// recursively. Directories named `target` and hidden directories (those
/// starting with `.`) are skipped. Files come back in a stable order: inputs
/// in the order given, directory contents sorted by file name. Handler order
/// decides which operation wins a path+method collision, so the order must
/// not depend on the filesystem.
pub struct FileScanner {
    inputs: Vec<PathBuf>,
}

/// Result of a scanning operation.
pub struct ScanResult {
    /// Paths to all discovered `.rs` files, without duplicates
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for inputs or entries that could not be used
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` over the given inputs
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self { inputs }
    }

    /// Collects all `.rs` files reachable from the inputs.
    ///
    /// Missing inputs and inaccessible entries are recorded as warnings and
    /// skipped; scanning continues with the rest.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for input in &self.inputs {
            if input.is_file() {
                if is_rust_file(input) {
                    push_unique(&mut rust_files, input.clone());
                } else {
                    let warning = format!("Not a Rust source file: {}", input.display());
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            } else if input.is_dir() {
                self.scan_dir(input, &mut rust_files, &mut warnings);
            } else {
                let warning = format!("Input does not exist: {}", input.display());
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        debug!("Scan found {} Rust files", rust_files.len());
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }

    fn scan_dir(&self, root: &Path, rust_files: &mut Vec<PathBuf>, warnings: &mut Vec<String>) {
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == root {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_rust_file(path) {
                        push_unique(rust_files, path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
    }
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("rs")
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}
