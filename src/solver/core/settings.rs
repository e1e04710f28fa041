use crate::solver::DefaultSettings;
use thiserror::Error;

/// Core solver settings.
///
/// This is identical to the [`DefaultSettings`](crate::solver::implementations::default::DefaultSettings)
/// used by the default solver implementation.
pub type CoreSettings<T> = DefaultSettings<T>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its admissible range
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// A field is not of the requested value kind (integer or floating point)
    #[error("Field \"{0}\" is not of the requested kind")]
    BadFieldKind(&'static str),
}
