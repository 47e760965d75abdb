//! Command-line front end for the keyed sort engine
//!
//! Reads lines from files or stdin, sorts (or checks) them, and writes the
//! result to stdout or `-o FILE`.

use clap::{Arg, ArgAction, Command};
use log::{debug, LevelFilter};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use keyed_sort::{
    config::{SortConfig, SortConfigBuilder, SortMode},
    error::{SortContext, SortError, SortResult},
    input, CoreSort, EXIT_FAILURE, EXIT_SUCCESS,
};

fn main() {
    match run() {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("sort: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run() -> SortResult<i32> {
    let matches = build_cli().get_matches();
    let config = parse_config_from_matches(&matches)?;
    init_logging(config.debug);

    let input_files: Vec<String> = matches
        .get_many::<String>("files")
        .unwrap_or_default()
        .cloned()
        .collect();
    let output = matches.get_one::<String>("output").cloned();

    debug!(
        "mode={} column={} separator={:?} chunk_size={}",
        config.mode, config.key_column, config.field_separator, config.chunk_size
    );

    let input = input::read_input(&input_files)?;

    if config.check {
        let sorter = CoreSort::new(config);
        return Ok(match sorter.first_disorder(&input.lines) {
            None => EXIT_SUCCESS,
            Some(index) => {
                let (source, line_number) = input.locate(index);
                eprintln!(
                    "sort: {}:{}: disorder: {}",
                    source, line_number, input.lines[index]
                );
                EXIT_FAILURE
            }
        });
    }

    let sorted = CoreSort::new(config).sort(input.lines)?;
    write_output(&sorted, output.as_deref())?;
    Ok(EXIT_SUCCESS)
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if env::var("RUST_LOG").is_err() {
        let level = if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        builder
            .filter_module("keyed_sort", level)
            .filter_module("sort", level);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

fn build_cli() -> Command {
    Command::new("sort")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("sort [OPTION]... [FILE]...")
        .about("Sort lines of text files")
        .long_about("Sort lines of text files by the whole line or by one column, comparing keys as text, numbers, month names, or human-readable sizes.\n\nLarge inputs are sorted in chunks spilled to temporary files and merged.")
        .disable_help_flag(true) // We use -h for human-numeric-sort
        .disable_version_flag(true)

        // Input files
        .arg(Arg::new("files")
            .help("Input files to sort (use '-' or omit for stdin)")
            .num_args(0..)
            .value_name("FILE"))

        // Sort modes (mutually exclusive)
        .arg(Arg::new("numeric-sort")
            .short('n')
            .long("numeric-sort")
            .help("Compare according to numerical value")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("month-sort")
            .short('M')
            .long("month-sort")
            .help("Compare by month names (JAN < ... < DEC)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("human-numeric-sort")
            .short('h')
            .long("human-numeric-sort")
            .help("Compare human readable numbers (e.g., 2K 1G)")
            .action(ArgAction::SetTrue))

        // Sort modifiers
        .arg(Arg::new("reverse")
            .short('r')
            .long("reverse")
            .help("Reverse the sorted output")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("unique")
            .short('u')
            .long("unique")
            .help("Output only the first of a run of identical lines")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("ignore-trailing-blanks")
            .short('b')
            .long("ignore-trailing-blanks")
            .help("Strip trailing spaces and tabs before sorting")
            .action(ArgAction::SetTrue))

        // Field and key options
        .arg(Arg::new("key")
            .short('k')
            .long("key")
            .help("Sort by column N (1-based); 0 uses the whole line")
            .allow_negative_numbers(true)
            .value_name("N"))
        .arg(Arg::new("field-separator")
            .short('t')
            .long("field-separator")
            .help("Use SEP as the column separator (default: tab)")
            .value_name("SEP"))

        // I/O options
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .help("Write result to FILE instead of standard output")
            .value_name("FILE"))

        // Operation modes
        .arg(Arg::new("check")
            .short('c')
            .long("check")
            .help("Check for sorted input; do not sort")
            .action(ArgAction::SetTrue))

        // Performance options
        .arg(Arg::new("chunk-size")
            .short('S')
            .long("chunk-size")
            .help("Sort at most LINES lines in memory; larger inputs are merged from disk")
            .value_name("LINES"))
        .arg(Arg::new("temporary-directory")
            .short('T')
            .long("temporary-directory")
            .help("Use DIR for temporaries, not $TMPDIR or /tmp")
            .value_name("DIR"))
        .arg(Arg::new("parallel")
            .long("parallel")
            .help("Sort large in-memory batches on all cores")
            .action(ArgAction::SetTrue))

        // Additional options
        .arg(Arg::new("debug")
            .long("debug")
            .help("Log engine decisions to stderr")
            .action(ArgAction::SetTrue))

        // Add explicit help and version options since we disabled the automatic ones
        .arg(Arg::new("help")
            .long("help")
            .help("Display this help and exit")
            .action(ArgAction::Help))
        .arg(Arg::new("version")
            .long("version")
            .help("Output version information and exit")
            .action(ArgAction::Version))
}

/// Parse configuration from command line matches
fn parse_config_from_matches(matches: &clap::ArgMatches) -> SortResult<SortConfig> {
    let mut builder = SortConfigBuilder::new();

    // Determine sort mode (mutually exclusive)
    let requested: Vec<(&str, SortMode)> = [
        ("-n", "numeric-sort", SortMode::Numeric),
        ("-M", "month-sort", SortMode::Month),
        ("-h", "human-numeric-sort", SortMode::HumanNumeric),
    ]
    .into_iter()
    .filter(|(_, id, _)| matches.get_flag(id))
    .map(|(flag, _, mode)| (flag, mode))
    .collect();

    match requested.as_slice() {
        [] => {}
        [(_, mode)] => builder = builder.mode(*mode),
        [(first, _), (second, _), ..] => {
            return Err(SortError::conflicting_options(&format!(
                "options {first} and {second} are incompatible"
            )));
        }
    }

    // Apply boolean flags
    if matches.get_flag("reverse") {
        builder = builder.reverse();
    }
    if matches.get_flag("unique") {
        builder = builder.unique();
    }
    if matches.get_flag("check") {
        builder = builder.check();
    }
    if matches.get_flag("ignore-trailing-blanks") {
        builder = builder.trim_trailing();
    }
    if matches.get_flag("parallel") {
        builder = builder.parallel();
    }

    if let Some(key) = matches.get_one::<String>("key") {
        let column = key
            .trim()
            .parse::<usize>()
            .map_err(|_| SortError::invalid_key_column(key))?;
        builder = builder.key_column(column);
    }

    if let Some(sep_str) = matches.get_one::<String>("field-separator") {
        builder = builder.field_separator(parse_separator(sep_str)?);
    }

    if let Some(temp_dir) = matches.get_one::<String>("temporary-directory") {
        builder = builder.temp_dir(PathBuf::from(temp_dir));
    }

    let mut config = builder.build()?;
    config.debug = matches.get_flag("debug");

    if let Some(size_str) = matches.get_one::<String>("chunk-size") {
        config.set_chunk_size_from_string(size_str)?;
    }

    // Validate the final configuration
    config.validate()?;

    Ok(config)
}

/// A separator must be exactly one character; `\t` and `\0` are accepted as escapes
fn parse_separator(sep_str: &str) -> SortResult<char> {
    match sep_str {
        "\\t" => return Ok('\t'),
        "\\0" => return Ok('\0'),
        _ => {}
    }

    let mut chars = sep_str.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => Ok(sep),
        _ => Err(SortError::invalid_field_separator(sep_str)),
    }
}

fn write_output(lines: &[String], output: Option<&str>) -> SortResult<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_file_context(path)?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> SortResult<SortConfig> {
        let matches = build_cli()
            .try_get_matches_from(args)
            .expect("Failed to parse test arguments");
        parse_config_from_matches(&matches)
    }

    #[test]
    fn test_parse_basic_config() {
        let config = parse(&["sort", "-n", "-r"]).expect("Failed to parse test config");
        assert_eq!(config.mode, SortMode::Numeric);
        assert!(config.reverse);
    }

    #[test]
    fn test_parse_complex_config() {
        let config = parse(&[
            "sort", "-k", "2", "-t", ":", "-u", "-b", "-S", "500", "-o", "output.txt",
            "input.txt",
        ])
        .expect("Failed to parse test config");

        assert_eq!(config.key_column, 2);
        assert_eq!(config.field_separator, ':');
        assert!(config.unique);
        assert!(config.trim_trailing);
        assert_eq!(config.chunk_size, 500);
    }

    #[test]
    fn test_default_separator_is_tab() {
        let config = parse(&["sort", "-k", "3"]).expect("Failed to parse test config");
        assert_eq!(config.field_separator, '\t');
        assert_eq!(config.mode, SortMode::Lexicographic);
    }

    #[test]
    fn test_conflicting_modes() {
        let result = parse(&["sort", "-n", "-M"]);
        assert!(matches!(result, Err(SortError::ConflictingOptions { .. })));
        assert!(parse(&["sort", "-h", "-M"]).is_err());
    }

    #[test]
    fn test_invalid_key_column() {
        assert!(matches!(
            parse(&["sort", "-k", "-1"]),
            Err(SortError::InvalidKeyColumn { .. })
        ));
        assert!(parse(&["sort", "-k", "two"]).is_err());
    }

    #[test]
    fn test_separator_parsing() {
        assert_eq!(parse_separator(",").ok(), Some(','));
        assert_eq!(parse_separator("\\t").ok(), Some('\t'));
        assert_eq!(parse_separator("é").ok(), Some('é'));
        assert!(parse_separator("::").is_err());
        assert!(parse_separator("").is_err());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            parse(&["sort", "-S", "0"]),
            Err(SortError::InvalidChunkSize { .. })
        ));
    }
}
