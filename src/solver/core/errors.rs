use super::SettingsError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Error type returned by fallible solver operations.
///
/// Any operation returning one of these errors leaves the solver unmodified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Memory for the solver could not be reserved at construction
    #[error("Memory allocation failed during solver construction")]
    MemoryError,
    /// A time step, storage slot or constraint index is out of its valid range
    #[error("{}", index_message(.what, .index, .bound))]
    IndexError {
        what: &'static str,
        index: i64,
        bound: usize,
    },
    /// A coefficient array does not agree with the declared problem dimensions
    #[error("{what} has {found} entries, expected {expected}")]
    DimensionError {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Mutually exclusive or invalid configuration requested
    #[error("Invalid configuration: {0}")]
    ConfigError(&'static str),
}

impl SolverError {
    pub(crate) fn index(what: &'static str, index: usize, bound: usize) -> Self {
        SolverError::IndexError {
            what,
            index: index as i64,
            bound,
        }
    }

    pub(crate) fn dimension(what: &'static str, expected: usize, found: usize) -> Self {
        SolverError::DimensionError {
            what,
            expected,
            found,
        }
    }

    /// Fails with a `DimensionError` unless `found == expected`
    pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), Self> {
        if expected != found {
            Err(SolverError::dimension(what, expected, found))
        } else {
            Ok(())
        }
    }
}

// negative indices are range checked before any horizon is known
fn index_message(what: &str, index: &i64, bound: &usize) -> String {
    if *index < 0 {
        format!("{what} index {index} is negative, only -1 (every time step) is accepted")
    } else {
        format!("{what} index {index} is out of range [0, {bound})")
    }
}

impl From<TryReserveError> for SolverError {
    fn from(_: TryReserveError) -> Self {
        SolverError::MemoryError
    }
}

impl From<SettingsError> for SolverError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::BadFieldValue(field) => SolverError::ConfigError(field),
            SettingsError::BadFieldKind(field) => SolverError::ConfigError(field),
        }
    }
}

#[test]
fn test_error_messages() {
    let e = SolverError::index("time step", 7, 5);
    assert_eq!(e.to_string(), "time step index 7 is out of range [0, 5)");

    let e = SolverError::check_len("state cost q", 3, 2).unwrap_err();
    assert_eq!(e.to_string(), "state cost q has 2 entries, expected 3");
    assert!(SolverError::check_len("q", 2, 2).is_ok());

    let e: SolverError = SettingsError::BadFieldValue("rho").into();
    assert_eq!(e, SolverError::ConfigError("rho"));
}

/// Failure of the KKT factorization.  Never returned to the user; the solver
/// reports it through its status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KKTError {
    /// The reduced system of the given time step has no positive definite factor
    #[error("KKT system is singular at time step {0}")]
    SingularSystem(usize),
}
