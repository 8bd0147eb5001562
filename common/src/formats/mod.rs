pub mod capacity;
pub mod cost;
pub mod cursor;
pub mod placement;
pub mod route;

use std::str::FromStr;
use thiserror::Error;

/// Typed parse failure. Every variant names the source file and, where one
/// exists, the line and token that caused it, so a caller can report the
/// failure without ever seeing a partially populated model.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Unknown command token, or a record met while no record is expected.
    #[error("{file}:{line}: unexpected token '{token}'")]
    Structural {
        file: String,
        line: usize,
        token: String,
    },

    #[error("{file}:{line}: record '{record}' has {found} fields, expected {expected}")]
    Arity {
        file: String,
        line: usize,
        record: String,
        expected: usize,
        found: usize,
    },

    #[error("{file}:{line}: cannot parse '{token}' as a number")]
    Numeric {
        file: String,
        line: usize,
        token: String,
    },

    /// A count or cross-file invariant violation.
    #[error("{file}:{line}: {message}")]
    Consistency {
        file: String,
        line: usize,
        message: String,
    },
}

pub(crate) fn structural(file: &str, line: usize, token: &str) -> FormatError {
    FormatError::Structural {
        file: file.to_string(),
        line,
        token: token.to_string(),
    }
}

pub(crate) fn consistency(file: &str, line: usize, message: String) -> FormatError {
    FormatError::Consistency {
        file: file.to_string(),
        line,
        message,
    }
}

pub(crate) fn require(
    file: &str,
    line: usize,
    record: &str,
    tokens: &[&str],
    expected: usize,
) -> Result<(), FormatError> {
    if tokens.len() != expected {
        return Err(FormatError::Arity {
            file: file.to_string(),
            line,
            record: record.to_string(),
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

pub(crate) fn num<T: FromStr>(file: &str, line: usize, token: &str) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::Numeric {
        file: file.to_string(),
        line,
        token: token.to_string(),
    })
}
