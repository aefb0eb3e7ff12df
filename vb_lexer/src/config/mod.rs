//! Configuration module for the VB lexer
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
// This file is generated at compile time from the selected TOML profile
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

// Fixed language constants and runtime preferences
pub mod constants;
pub mod runtime;

pub use runtime::{LexerPreferences, LoggingPreferences, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("VBL_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("VBL_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(compile_time::classifier::MAX_EPSILON_STEPS >= compile_time::classifier::MAX_FRAME_DEPTH);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_FILE <= compile_time::logging::LOG_BUFFER_SIZE
        );
        assert!(compile_time::lexical::MAX_IDENTIFIER_LENGTH > 0);
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(build_info::source_info().ends_with(".toml"));
        assert!(build_info::source_info().contains(build_info::profile()));
    }
}
