use log::{debug, info, trace};
use serde_json::{Number, Value};

use std::cmp;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Log written by the primary implementation.
pub const PRIMARY_LOG: &str = "py.log";
/// Log written by the reference implementation.
pub const REFERENCE_LOG: &str = "r.log";

/// Compare the two logs and print the first mismatch, if any.
pub fn run(config: Config) -> Result<Option<Mismatch>, Error> {
    let first = read_lines(&config.first_input)?;
    let second = read_lines(&config.second_input)?;

    let mismatch = compare_lines(&first, &second, &config)?;
    if let Some(ref mismatch) = mismatch {
        println!("{}", mismatch);
    }
    Ok(mismatch)
}

/// Program configuration.
#[derive(Debug, Clone)]
pub struct Config {
    first_input: PathBuf,  // primary log
    second_input: PathBuf, // reference log
}

impl Default for Config {
    fn default() -> Config {
        Config::with_inputs(PRIMARY_LOG, REFERENCE_LOG)
    }
}

impl Config {
    /// Compare two arbitrary files instead of the fixed log names.
    pub fn with_inputs<P: Into<PathBuf>, Q: Into<PathBuf>>(first: P, second: Q) -> Config {
        Config {
            first_input: first.into(),
            second_input: second.into(),
        }
    }

    /// Path of the primary log.
    pub fn first_input(&self) -> &Path {
        &self.first_input
    }

    /// Path of the reference log.
    pub fn second_input(&self) -> &Path {
        &self.second_input
    }
}

/// First pair of lines whose decoded values differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// 1-based line number.
    pub line: usize,
    pub first: Value,
    pub second: Value,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:\n{}\n!=\n{}", self.line, self.first, self.second)
    }
}

/// Failure to load or decode one of the logs.
#[derive(Debug)]
pub enum Error {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Error::Parse { path, line, source } => {
                write!(f, "{}:{}: invalid JSON: {}", path.display(), line, source)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Parse { source, .. } => Some(source),
        }
    }
}

/// Read a whole file as a list of lines.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lines: Vec<String> = content.lines().map(String::from).collect();
    debug!("loaded {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Parse the line at `index` (0-based) of `path`.
pub fn parse_line<P: AsRef<Path>>(path: P, index: usize, text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|source| Error::Parse {
        path: path.as_ref().to_path_buf(),
        line: index + 1,
        source,
    })
}

/// Compare two logs line by line over their common prefix.
///
/// Returns the first pair of lines that decode to different values. Lines
/// after it are never parsed.
pub fn compare_lines(
    first: &[String],
    second: &[String],
    config: &Config,
) -> Result<Option<Mismatch>, Error> {
    let common = cmp::min(first.len(), second.len());
    debug!("comparing {} common lines", common);
    if first.len() != second.len() {
        info!(
            "logs differ in length ({} vs {}), {} trailing lines not compared",
            first.len(),
            second.len(),
            cmp::max(first.len(), second.len()) - common
        );
    }

    for (i, (line1, line2)) in first.iter().zip(second.iter()).enumerate() {
        trace!("line {}", i + 1);
        let val1 = parse_line(&config.first_input, i, line1)?;
        let val2 = parse_line(&config.second_input, i, line2)?;
        if !json_eq(&val1, &val2) {
            return Ok(Some(Mismatch {
                line: i + 1,
                first: val1,
                second: val2,
            }));
        }
    }
    Ok(None)
}

/// Deep equality of two decoded values.
///
/// Numbers compare by value: `2`, `2.0` and `2e0` are equal, integers of any
/// size compare exactly. Values of different variants are never equal.
pub fn json_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(n1), Value::Number(n2)) => number_eq(n1, n2),
        (Value::Array(v1), Value::Array(v2)) => {
            v1.len() == v2.len() && v1.iter().zip(v2.iter()).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(m1), Value::Object(m2)) => {
            m1.len() == m2.len()
                && m1
                    .iter()
                    .all(|(k, v1)| m2.get(k).map_or(false, |v2| json_eq(v1, v2)))
        }
        _ => lhs == rhs,
    }
}

fn number_eq(n1: &Number, n2: &Number) -> bool {
    match (integer_text(n1), integer_text(n2)) {
        (Some(i1), Some(i2)) => i1 == i2,
        _ => match (n1.as_f64(), n2.as_f64()) {
            (Some(f1), Some(f2)) => f1 == f2,
            _ => n1.to_string() == n2.to_string(),
        },
    }
}

// canonical text of an integer literal, `None` for fractions and exponents
fn integer_text(n: &Number) -> Option<String> {
    let text = n.to_string();
    if text.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        return None;
    }
    if text == "-0" {
        return Some("0".to_string());
    }
    Some(text)
}
