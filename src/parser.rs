use crate::error::Error;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for handler source files.
///
/// Uses `syn` to turn Rust source into a syntax tree that the discovery pass
/// walks for annotated functions.
pub struct AstParser;

/// A successfully parsed Rust file with its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let parsed = Self::parse_source(path, &content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        debug!("Successfully parsed file: {}", path.display());
        Ok(parsed)
    }

    /// Parses in-memory source, attributing it to `path`
    pub fn parse_source(path: &Path, content: &str) -> crate::error::Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple files, continuing past failures.
    ///
    /// Failures are logged as warnings so a single broken file does not stop
    /// generation for the rest.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_annotated_handler_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            #[api_operation(summary = "Get user by ID")]
            #[api_param(name = "userId", type = "string")]
            pub async fn get_user_handler() {}
        "#;

        let file_path = create_temp_file(&temp_dir, "handlers.rs", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.syntax_tree.items.len(), 1);
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "invalid.rs", "fn broken( { let x = ; }");

        let err_msg = AstParser::parse_file(&file_path).unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/file.rs"));

        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_source_error_names_file() {
        let err = AstParser::parse_source(Path::new("src/broken.rs"), "struct Missing }")
            .unwrap_err();

        match err {
            Error::ParseError { file, .. } => assert_eq!(file, PathBuf::from("src/broken.rs")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();

        let file1 = create_temp_file(&temp_dir, "file1.rs", "pub fn hello() {}");
        let file2 = create_temp_file(&temp_dir, "file2.rs", "pub struct World;");
        let file3 = create_temp_file(&temp_dir, "file3.rs", "pub fn broken( {");

        let paths = vec![file1.clone(), file2.clone(), file3];
        let results = AstParser::parse_files(&paths);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().path, file1);
        assert_eq!(results[1].as_ref().unwrap().path, file2);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_parse_files_empty_list() {
        let results = AstParser::parse_files(&[]);
        assert!(results.is_empty());
    }
}
