use std::env;
use std::path::{Path, PathBuf};
use vb_lexer::config::{LexerPreferences, RuntimeConfig};
use vb_lexer::file_processor::{self, FileProcessor};
use vb_lexer::lexical::{self, Special, TokenizeResult};
use vb_lexer::{log_info, logging};
use vb_lexer::utils::SourceMap;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: Option<PathBuf>,
    json: bool,
    specials: bool,
    quiet: bool,
    config: Option<PathBuf>,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("vb_lexer");

    let options = match parse_options(args.get(1..).unwrap_or_default()) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <input.vb|directory> [options]", program);
            eprintln!("       {} --help", program);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program);
        return Ok(());
    }

    let runtime = match &options.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;
    file_processor::init_file_processor_logging()?;
    lexical::init_lexical_analysis_logging()?;

    let Some(input_path) = options.input.as_deref() else {
        eprintln!("Error: no input given");
        std::process::exit(1);
    };

    let files = if input_path.is_file() {
        vec![input_path.to_path_buf()]
    } else if input_path.is_dir() {
        file_processor::discover_vb_files(input_path)?
    } else {
        eprintln!("Error: Input must be a file (.vb) or directory");
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    };

    log_info!("Lexing input", "path" => input_path.display(), "files" => files.len());

    let processor = FileProcessor::new().with_vb_extension_required(input_path.is_dir());
    let mut failed_files = 0;

    for (file_id, path) in files.iter().enumerate() {
        let ok = logging::with_file_context(path.clone(), file_id, || {
            lex_file(&processor, path, &runtime.lexer, &options)
        });
        if !ok {
            failed_files += 1;
        }
    }

    if !options.quiet || failed_files > 0 {
        logging::print_cargo_style_summary();
    }

    if !options.quiet {
        println!(
            "Lexed {} file(s): {} clean, {} with errors",
            files.len(),
            files.len() - failed_files,
            failed_files
        );
    }

    if failed_files > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Lexes one file and prints what the options ask for; false when the file
/// could not be read or produced diagnostics
fn lex_file(processor: &FileProcessor, path: &Path, preferences: &LexerPreferences, options: &CliOptions) -> bool {
    let source = match processor.process_file(path) {
        Ok(file) => file.source,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            return false;
        }
    };

    let result = lexical::tokenize_with_preferences(&source, preferences);

    if options.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(error) => eprintln!("Failed to serialize tokens for {}: {}", path.display(), error),
        }
    } else if !options.quiet {
        print_tokens(path, &result);
        if options.specials {
            print_specials(&result);
        }
    }

    if result.has_errors() {
        let map = SourceMap::new(&source);
        for diagnostic in &result.diagnostics {
            let message = format!("[{}] {}: {}", diagnostic.code(), path.display(), diagnostic.message());
            eprint!("{}", map.format_error(diagnostic.location, &message));
        }
    }

    !result.has_errors()
}

fn print_tokens(path: &Path, result: &TokenizeResult) {
    println!("== {} ==", path.display());
    for token in &result.tokens {
        println!("{}", token);
    }
}

fn print_specials(result: &TokenizeResult) {
    println!("-- specials --");
    for special in &result.specials {
        match special {
            Special::Comment(comment) => {
                println!("{} comment({:?}) {:?}", comment.span.start, comment.kind, comment.text)
            }
            Special::Directive(directive) => {
                println!("{} {} {}", directive.span.start, directive.name, directive.argument)
            }
            Special::BlankLine(location) => println!("{} blank", location),
        }
    }
    for tag in &result.tag_comments {
        println!("{} {}: {}", tag.span.start, tag.tag, tag.text);
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--json" => options.json = true,
            "--specials" => options.specials = true,
            "--quiet" => options.quiet = true,
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => return Err(format!("Unknown option '{}'", other)),
            other => {
                if options.input.is_some() {
                    return Err(format!("Unexpected argument '{}'", other));
                }
                options.input = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    if options.input.is_none() && !options.help {
        return Err("Missing input path".to_string());
    }

    Ok(options)
}

fn print_help(program_name: &str) {
    println!("VB Lexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizes VB source with XML literal disambiguation");
    println!();
    println!("USAGE:");
    println!("    {} <input.vb>                # Lex a single file", program_name);
    println!("    {} <directory> [options]     # Lex every .vb file below a directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print the full tokenization result as JSON");
    println!("    --specials          Also print comments, directives and tag comments");
    println!("    --quiet             Only report errors");
    println!("    --config <file>     Load lexer and logging preferences from TOML");
    println!();
    println!("ENVIRONMENT:");
    println!("    VBL_LEXER_COMMENT_TAGS, VBL_LEXER_REPORT_CLASSIFIER_ERRORS,");
    println!("    VBL_LEXER_DETAILED_METRICS, VBL_LOGGING_MIN_LEVEL and the other VBL_LOGGING_* variables");
    println!();
    println!("BUILD:");
    println!("    {}", vb_lexer::config::build_info::source_info());
    println!("    max file size: {} bytes", file_processor::get_max_file_size());
    println!("    max tokens per file: {}", lexical::get_lexical_limits().max_token_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&["src/", "--json", "--config", "prefs.toml", "--quiet"])).unwrap();

        assert_eq!(options.input, Some(PathBuf::from("src/")));
        assert!(options.json);
        assert!(options.quiet);
        assert!(!options.specials);
        assert_eq!(options.config, Some(PathBuf::from("prefs.toml")));
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&args(&[])).is_err());
        assert!(parse_options(&args(&["a.vb", "--threads"])).is_err());
        assert!(parse_options(&args(&["a.vb", "--config"])).is_err());
        assert!(parse_options(&args(&["a.vb", "b.vb"])).is_err());
    }

    #[test]
    fn test_help_needs_no_input() {
        let options = parse_options(&args(&["--help"])).unwrap();
        assert!(options.help);
        assert!(options.input.is_none());
    }
}
