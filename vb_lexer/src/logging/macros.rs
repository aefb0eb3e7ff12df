//! Logging macros
//!
//! Context values are taken as `"key" => value` pairs where the value only
//! needs `Display`. Every macro is a no-op until global logging is set up.

/// Collects `"key" => value` pairs into owned strings and borrows them as
/// the `Vec<(&str, &str)>` the logging functions take
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($call:expr; $($key:expr => $value:expr),*) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),*];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $call(context_refs)
        }
    };
}

/// `log_error!(code, message [, location = loc] [, "key" => value ...])`
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, location = $location:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($location), vec![])
    };

    ($code:expr, $message:expr, location = $location:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_context!(
            |context| $crate::logging::log_error_with_context($code, $message, Some($location), context);
            $($key => $value),+
        )
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_context!(
            |context| $crate::logging::log_error_with_context($code, $message, None, context);
            $($key => $value),+
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_context!(
            |context| $crate::logging::log_success_with_context($code, $message, context);
            $($key => $value),+
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_context!(
            |context| $crate::logging::log_info_with_context($message, context);
            $($key => $value),+
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_context!(
            |context| $crate::logging::log_warning_with_context($message, context);
            $($key => $value),+
        )
    };
}

/// Context values are only formatted when debug events are enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::log_debug_with_context($message, vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::__log_context!(
                |context| $crate::logging::log_debug_with_context($message, context);
                $($key => $value),+
            )
        }
    };
}

/// `log_success!` with the elapsed time added as `duration_ms`
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
        )
    };

    ($code:expr, $message:expr, duration = $duration:expr, $($key:expr => $value:expr),+) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0),
            $($key => $value),+
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Location;

    #[test]
    fn test_macros_without_global_logger() {
        let file_size: u64 = 1024;
        let line_count: usize = 42;
        let duration = std::time::Duration::from_millis(150);

        log_error!(codes::lexical::INVALID_CHARACTER, "Unknown char(\u{20ac}) which can't be read",
            location = Location::new(3, 7),
            "char" => '\u{20ac}'
        );

        log_error!(codes::lexical::UNTERMINATED_DATE, "End of File reached before Date literal terminated",
            location = Location::new(1, 1)
        );

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "tokens" => 157,
            "file_size" => file_size
        );

        log_info!("Processing file",
            "is_large" => file_size > 1000,
            "lines" => line_count
        );

        let path = std::path::PathBuf::from("/path/to/Module1.vb");
        log_warning!("File is empty", "path" => path.display());

        log_debug!("Classifier state", "depth" => 4);

        log_performance!(codes::success::FILE_PROCESSING_SUCCESS,
            "File processed successfully",
            duration = duration,
            "lines" => line_count
        );
    }
}
