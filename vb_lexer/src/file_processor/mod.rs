//! Source file access for the lexer binary, bounded by compile-time limits

mod processor;

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::logging::codes::{self, file_processing};
use crate::log_debug;
use std::path::Path;
pub use processor::{discover_vb_files, is_vb_file, FileProcessor, FileProcessorError, SourceFile, VB_EXTENSION};

/// Reads a `.vb` file with the default checks
pub fn process_file(path: &Path) -> Result<SourceFile, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Startup check that every file processing code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    for code in [
        file_processing::FILE_NOT_FOUND,
        file_processing::INVALID_EXTENSION,
        file_processing::FILE_TOO_LARGE,
        file_processing::EMPTY_FILE,
        file_processing::PERMISSION_DENIED,
        file_processing::INVALID_ENCODING,
        file_processing::IO_ERROR,
        file_processing::INVALID_PATH,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("File processor error code {} is not registered", code));
        }
    }

    log_debug!("File processor limits",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_file_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Program.vb");
        fs::write(&path, "Module Program\nEnd Module\n").unwrap();

        assert_eq!(process_file(&path).unwrap().line_count, 2);
        assert!(process_file(&dir.path().join("Program.txt")).is_err());
    }

    #[test]
    fn test_limits() {
        assert!(LARGE_FILE_THRESHOLD <= get_max_file_size());
        assert!(init_file_processor_logging().is_ok());
    }
}
