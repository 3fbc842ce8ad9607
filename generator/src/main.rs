mod cli;

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use dt_outline::signature::{self, SignatureOptions};
use dt_xsd::ReadOptions;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Returns `false` if a `--check` found a difference.
fn run(cli: &cli::Cli) -> Result<bool> {
    let bytes = load(&cli.input)?;
    let text = dt_xsd::decode(&bytes);
    let document = dt_xsd::parse_document(&text, cli.allow_dtd)
        .with_context(|| format!("failed to parse {}", cli.input))?;

    let read_options = ReadOptions {
        package: cli.package.clone(),
        builtin_overwrite: cli.builtin_overwrite.into(),
    };
    let outline = dt_xsd::read_outline(&document, &read_options)
        .with_context(|| format!("failed to bind {}", cli.input))?;
    info!(classes = outline.class_count(), "bound schema");

    let mut signature_options = SignatureOptions::default();
    if !cli.builtin_namespaces.is_empty() {
        signature_options.builtin_namespaces = cli.builtin_namespaces.clone();
    }

    if let Some(golden) = &cli.check {
        let expected = fs::read_to_string(golden)
            .with_context(|| format!("failed to read {}", golden.display()))?;
        let actual = signature::to_string(&outline, &signature_options);
        return Ok(match first_difference(&expected, &actual) {
            None => true,
            Some(difference) => {
                eprintln!("signature differs from {}", golden.display());
                eprintln!("{difference}");
                false
            }
        });
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            signature::write(&outline, &signature_options, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => signature::write(&outline, &signature_options, io::stdout().lock())
            .context("failed to write to stdout")?,
    }
    Ok(true)
}

/// Reads a local file or fetches an `http(s)` URL.
fn load(input: &str) -> Result<Vec<u8>> {
    if input.starts_with("http://") || input.starts_with("https://") {
        debug!(url = input, "fetching schema");
        let response = reqwest::blocking::get(input)
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to fetch {input}"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("failed to fetch {input}"))?;
        Ok(bytes.to_vec())
    } else {
        fs::read(input).with_context(|| format!("failed to read {input}"))
    }
}

/// The first line in which two signatures differ, if any. Signatures must match byte for byte;
/// lines that differ only in their line ending are shown quoted.
fn first_difference(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }

    let mut expected_lines = expected.split_inclusive('\n');
    let mut actual_lines = actual.split_inclusive('\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return None,
            (expected, actual) if expected == actual => line += 1,
            (expected, actual) => {
                let quoted = line_content(expected) == line_content(actual);
                return Some(format!(
                    "line {line}:\n  expected: {}\n  actual:   {}",
                    show_line(expected, quoted),
                    show_line(actual, quoted),
                ));
            }
        }
    }
}

fn line_content(line: Option<&str>) -> Option<&str> {
    line.map(|line| line.trim_end_matches(['\r', '\n']))
}

fn show_line(line: Option<&str>, quoted: bool) -> String {
    match line {
        None => "<end of file>".to_owned(),
        Some(line) if quoted => format!("{line:?}"),
        Some(line) => line.trim_end_matches(['\r', '\n']).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_signatures() {
        let text = "package p {\n  interface A {\n  }\n}\n";
        assert_eq!(first_difference(text, text), None);
    }

    #[test]
    fn reports_first_differing_line() {
        let expected = "package p {\n  interface A {\n    int x;\n  }\n}\n";
        let actual = "package p {\n  interface A {\n    long x;\n  }\n}\n";
        assert_eq!(
            first_difference(expected, actual).unwrap(),
            "line 3:\n  expected:     int x;\n  actual:       long x;"
        );
    }

    #[test]
    fn line_endings_must_match() {
        let expected = "package p {\n}\n";
        assert_eq!(
            first_difference(expected, "package p {\r\n}\r\n").unwrap(),
            "line 1:\n  expected: \"package p {\\n\"\n  actual:   \"package p {\\r\\n\""
        );
        assert_eq!(
            first_difference(expected, "package p {\n}").unwrap(),
            "line 2:\n  expected: \"}\\n\"\n  actual:   \"}\""
        );
    }

    #[test]
    fn reports_missing_lines() {
        let expected = "package p {\n}\n";
        let actual = "package p {\n}\npackage q {\n}\n";
        assert_eq!(
            first_difference(expected, actual).unwrap(),
            "line 3:\n  expected: <end of file>\n  actual:   package q {"
        );
    }
}
