//! Reads VB source files under the compile-time size limits

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extension accepted for VB source files, compared case-insensitively
pub const VB_EXTENSION: &str = "vb";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("{path}: no such file")]
    FileNotFound { path: String },

    #[error("{path}: expected a .vb file")]
    InvalidExtension { path: String, extension: Option<String> },

    #[error("{path}: {size} bytes exceeds the {max_size} byte limit")]
    FileTooLarge { path: String, size: u64, max_size: u64 },

    #[error("{path}: file is empty")]
    EmptyFile { path: String },

    #[error("{path}: permission denied")]
    PermissionDenied { path: String },

    #[error("{path}: not valid UTF-8")]
    InvalidEncoding { path: String },

    #[error("{path}: {message}")]
    IoError { path: String, message: String },

    #[error("{path}: not a file")]
    InvalidPath { path: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing::*;
        match self {
            Self::FileNotFound { .. } => FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => INVALID_EXTENSION,
            Self::FileTooLarge { .. } => FILE_TOO_LARGE,
            Self::EmptyFile { .. } => EMPTY_FILE,
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => INVALID_ENCODING,
            Self::IoError { .. } => IO_ERROR,
            Self::InvalidPath { .. } => INVALID_PATH,
        }
    }

    /// Whether a multi-file run should stop rather than skip the file
    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn from_io(error: &io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                path,
                message: error.to_string(),
            },
        }
    }
}

/// A source file read into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    /// Size on disk in bytes
    pub size: u64,
    pub line_count: usize,
}

impl SourceFile {
    pub fn is_large(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    /// Reject files without a `.vb` extension
    pub require_vb_extension: bool,
    /// Reject zero-length files
    pub reject_empty_files: bool,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self {
            require_vb_extension: true,
            reject_empty_files: false,
        }
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vb_extension_required(mut self, required: bool) -> Self {
        self.require_vb_extension = required;
        self
    }

    pub fn with_empty_files_rejected(mut self, rejected: bool) -> Self {
        self.reject_empty_files = rejected;
        self
    }

    /// Checks `path` against the limits and reads it as UTF-8. Every failure
    /// is logged with its code before it is returned.
    pub fn process_file(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        let started = Instant::now();
        let file = self.read(path).map_err(|error| {
            log_error!(error.error_code(), &error.to_string(), "path" => path.display());
            error
        })?;

        if file.is_large() {
            log_warning!("Large source file",
                "path" => path.display(),
                "size" => human_readable(file.size));
        }

        log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source file read",
            "path" => path.display(),
            "size" => human_readable(file.size),
            "lines" => file.line_count,
            "duration_ms" => format!("{:.3}", started.elapsed().as_secs_f64() * 1000.0));

        Ok(file)
    }

    fn read(&self, path: &Path) -> Result<SourceFile, FileProcessorError> {
        let display = || path.display().to_string();

        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(FileProcessorError::InvalidPath { path: display() });
        }
        if self.require_vb_extension && !is_vb_file(path) {
            return Err(FileProcessorError::InvalidExtension {
                path: display(),
                extension: path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase()),
            });
        }

        let size = fs::metadata(path)
            .map_err(|e| FileProcessorError::from_io(&e, path))?
            .len();
        log_debug!("Checking source file", "path" => path.display(), "size" => size);

        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                path: display(),
                size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if size == 0 && self.reject_empty_files {
            return Err(FileProcessorError::EmptyFile { path: display() });
        }

        let source = fs::read_to_string(path).map_err(|e| FileProcessorError::from_io(&e, path))?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            line_count: source.lines().count(),
            source,
            size,
        })
    }
}

fn human_readable(size: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if size < 1024 {
        return format!("{} B", size);
    }
    let mut scaled = size as f64 / 1024.0;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", scaled, UNITS[unit])
}

/// Collects `.vb` files under `dir`, recursing into subdirectories, sorted
/// by path
pub fn discover_vb_files(dir: &Path) -> Result<Vec<PathBuf>, FileProcessorError> {
    if !dir.is_dir() {
        return Err(FileProcessorError::InvalidPath {
            path: dir.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| FileProcessorError::from_io(&e, &current))?;
        for entry in entries {
            let path = entry.map_err(|e| FileProcessorError::from_io(&e, &current))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_vb_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();

    if files.is_empty() {
        log_warning!("No .vb files found", "directory" => dir.display());
    } else {
        log_success!(codes::success::FILE_VALIDATION_PASSED, "Source files discovered",
            "directory" => dir.display(),
            "files" => files.len());
    }

    Ok(files)
}

pub fn is_vb_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(VB_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_reads_source_and_counts_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Module1.vb");
        fs::write(&path, "Module Module1\r\nEnd Module\r\n").unwrap();

        let file = FileProcessor::new().process_file(&path).unwrap();

        assert_eq!(file.line_count, 2);
        assert_eq!(file.size, 28);
        assert!(file.source.starts_with("Module Module1"));
        assert!(!file.is_large());
    }

    #[test]
    fn test_missing_file_and_directory() {
        let dir = tempdir().unwrap();
        let processor = FileProcessor::new();

        assert_matches!(
            processor.process_file(&dir.path().join("Missing.vb")),
            Err(FileProcessorError::FileNotFound { .. })
        );
        assert_matches!(
            processor.process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Huge.vb");
        fs::File::create(&path).unwrap().set_len(MAX_FILE_SIZE + 1).unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&path),
            Err(FileProcessorError::FileTooLarge { size, max_size, .. })
                if size == MAX_FILE_SIZE + 1 && max_size == MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        fs::write(&path, "Dim x = 1").unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext), .. }) if ext == "txt"
        );

        let relaxed = FileProcessor::new().with_vb_extension_required(false);
        assert_eq!(relaxed.process_file(&path).unwrap().source, "Dim x = 1");

        let upper = dir.path().join("FORM1.VB");
        fs::write(&upper, "").unwrap();
        assert!(FileProcessor::new().process_file(&upper).is_ok());
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Empty.vb");
        fs::write(&path, "").unwrap();

        assert_eq!(FileProcessor::new().process_file(&path).unwrap().line_count, 0);
        assert_matches!(
            FileProcessor::new().with_empty_files_rejected(true).process_file(&path),
            Err(FileProcessorError::EmptyFile { .. })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Latin1.vb");
        fs::write(&path, [b'D', b'i', b'm', b' ', 0xE9, b'\n']).unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&path),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_discover_vb_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested").join("deeper")).unwrap();
        fs::write(dir.path().join("b.vb"), "").unwrap();
        fs::write(dir.path().join("a.VB"), "").unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();
        fs::write(dir.path().join("nested").join("deeper").join("c.vb"), "").unwrap();

        let names: Vec<_> = discover_vb_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.VB", "b.vb", "nested/deeper/c.vb"]);

        assert_matches!(
            discover_vb_files(&dir.path().join("b.vb")),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_error_codes() {
        let missing = FileProcessorError::FileNotFound { path: "a.vb".into() };
        assert_eq!(missing.error_code(), codes::file_processing::FILE_NOT_FOUND);
        assert_eq!(missing.to_string(), "a.vb: no such file");
        assert!(missing.requires_halt());
        assert!(!missing.is_recoverable());

        let extension = FileProcessorError::InvalidExtension {
            path: "a.txt".into(),
            extension: Some("txt".into()),
        };
        assert!(extension.is_recoverable());
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable(512), "512 B");
        assert_eq!(human_readable(1536), "1.50 KB");
        assert_eq!(human_readable(3 * 1024 * 1024), "3.00 MB");
    }
}
