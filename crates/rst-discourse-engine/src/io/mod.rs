use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::models::{Document, DocumentMeta};
use crate::parsing::ParseError;

/// Corpus naming convention: `D<n>_C<n>_<anything>.rs3`, case-insensitive.
static DOCUMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)D\d+_C\d+_.*\.rs3$").expect("invalid document name regex"));

/// The `D<n>_C<n>` prefix identifying a document within its corpus.
static DOCUMENT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)D\d+_C\d+").expect("invalid document code regex"));

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid documents directory: {0}")]
    InvalidDocumentsDir(String),
    #[error("Invalid document name: {0}")]
    InvalidDocumentName(String),
}

/// Any failure loading one document file. Failures are per-document: the
/// batch loader reports them without aborting the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Outcome of loading one discovered file.
#[derive(Debug)]
pub struct DocumentLoadResult {
    pub path: PathBuf,
    pub result: Result<Document, LoadError>,
}

pub fn is_valid_document_name(name: &str) -> bool {
    DOCUMENT_NAME.is_match(name)
}

/// Extract the `D<n>_C<n>` code from a document file name.
pub fn document_code_from_name(name: &str) -> Result<String, IoError> {
    if !is_valid_document_name(name) {
        return Err(IoError::InvalidDocumentName(name.to_string()));
    }
    match DOCUMENT_CODE.find(name) {
        Some(code) => Ok(code.as_str().to_string()),
        None => Err(IoError::InvalidDocumentName(name.to_string())),
    }
}

/// Recursively scan for `.rs3` files in the documents directory.
pub fn scan_rs3_files(documents_dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !documents_dir.exists() {
        return Err(IoError::InvalidDocumentsDir(
            "documents directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(documents_dir, &mut files)?;
    files.sort();
    log::debug!(
        "{} rs3 files found under {}",
        files.len(),
        documents_dir.display()
    );
    Ok(files)
}

/// Files whose name contains the given code followed by a non-digit,
/// case-insensitive (so `D1_C1` does not match `D1_C10_...`).
pub fn find_rs3_files_by_code(documents_dir: &Path, code: &str) -> Result<Vec<PathBuf>, IoError> {
    let files = scan_rs3_files(documents_dir)?;
    Ok(files
        .into_iter()
        .filter(|file| {
            file.file_name()
                .map(|name| name_matches_code(&name.to_string_lossy(), code))
                .unwrap_or(false)
        })
        .collect())
}

/// Load and analyze a single RS3 file, attaching its identity metadata.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_valid_document_name(&name) {
        return Err(IoError::InvalidDocumentName(name).into());
    }
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()).into());
    }

    let code = document_code_from_name(&name)?;
    let xml = fs::read_to_string(path).map_err(IoError::Io)?;
    let document = Document::from_xml(&xml).map_err(LoadError::Parse)?;
    Ok(document.with_meta(DocumentMeta {
        name,
        code,
        path: path.to_path_buf(),
    }))
}

/// Load every `.rs3` file under the documents directory.
///
/// One entry per discovered file; a document that fails to parse or violates
/// a structural invariant is reported in its own entry and does not abort
/// the batch.
pub fn load_documents(documents_dir: &Path) -> Result<Vec<DocumentLoadResult>, IoError> {
    let files = scan_rs3_files(documents_dir)?;
    Ok(files
        .into_iter()
        .map(|path| {
            let result = load_document(&path);
            DocumentLoadResult { path, result }
        })
        .collect())
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext.eq_ignore_ascii_case("rs3")
        {
            files.push(path);
        }
    }

    Ok(())
}

fn name_matches_code(name: &str, code: &str) -> bool {
    let name = name.to_lowercase();
    let code = code.to_lowercase();
    let mut from = 0;
    while let Some(found) = name[from..].find(&code) {
        let end = from + found + code.len();
        let followed_by_digit = name[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if !followed_by_digit {
            return true;
        }
        from = from + found + 1;
    }
    false
}
