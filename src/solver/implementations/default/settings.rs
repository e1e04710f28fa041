use crate::solver::core::traits::Settings;
use crate::{algebra::*, solver::core::SettingsError};
use derive_builder::Builder;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard solver settings implementing the [`Settings`](crate::solver::core::traits::Settings) trait

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of ADMM iterations
    #[builder(default = "500")]
    pub max_iter: u32,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///base ADMM penalty, scaled by the relative weight of each constraint
    #[builder(default = "(1.0).as_T()")]
    pub rho: T,

    ///primal feasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub tol_primal: T,

    ///dual feasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub tol_dual: T,

    ///stationarity tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub tol_stationarity: T,

    ///complementarity tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub tol_complementarity: T,

    ///relative tolerance of the infeasibility certificate
    #[builder(default = "(1e-4).as_T()")]
    pub tol_infeas: T,

    ///augmentation weight of the entry equalities in the KKT recursion
    #[builder(default = "(1.0).as_T()")]
    pub kkt_sigma: T,

    ///relative pivot threshold below which a KKT block counts as singular
    #[builder(default = "(1e-13).as_T()")]
    pub kkt_pivot_tol: T,

    ///check the termination criteria every this many iterations
    #[builder(default = "1")]
    pub check_termination: u32,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    //NB: CoreSettings is typedef'd to DefaultSettings
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }

    /// Checks that every numerical field lies in its admissible range
    fn validate(&self) -> Result<(), SettingsError> {
        validate_count("max_iter", self.max_iter)?;
        validate_count("check_termination", self.check_termination)?;
        validate_positive("rho", self.rho)?;
        validate_positive("tol_primal", self.tol_primal)?;
        validate_positive("tol_dual", self.tol_dual)?;
        validate_positive("tol_stationarity", self.tol_stationarity)?;
        validate_positive("tol_complementarity", self.tol_complementarity)?;
        validate_positive("tol_infeas", self.tol_infeas)?;
        validate_positive("kkt_sigma", self.kkt_sigma)?;
        validate_positive("kkt_pivot_tol", self.kkt_pivot_tol)?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DefaultSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DefaultSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check the fields that have been explicitly set
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.max_iter {
            validate_count("max_iter", v)?;
        }
        if let Some(v) = self.check_termination {
            validate_count("check_termination", v)?;
        }
        let floats = [
            ("rho", self.rho),
            ("tol_primal", self.tol_primal),
            ("tol_dual", self.tol_dual),
            ("tol_stationarity", self.tol_stationarity),
            ("tol_complementarity", self.tol_complementarity),
            ("tol_infeas", self.tol_infeas),
            ("kkt_sigma", self.kkt_sigma),
            ("kkt_pivot_tol", self.kkt_pivot_tol),
        ];
        for (name, v) in floats {
            if let Some(v) = v {
                validate_positive(name, v)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_count(name: &'static str, v: u32) -> Result<(), SettingsError> {
    if v == 0 {
        return Err(SettingsError::BadFieldValue(name));
    }
    Ok(())
}

fn validate_positive<T: FloatT>(name: &'static str, v: T) -> Result<(), SettingsError> {
    // also rejects NaN
    if !(v > T::zero() && v.is_finite()) {
        return Err(SettingsError::BadFieldValue(name));
    }
    Ok(())
}

// ---------------------------------------------------------
// keyed option access
// ---------------------------------------------------------

/// Keys for reading and writing individual settings by name.
///
/// Parsed from the option names of the C interface with [`FromStr`],
/// which are identical to the [`DefaultSettings`] field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverOption {
    MaxIter,
    Verbose,
    Rho,
    TolPrimal,
    TolDual,
    TolStationarity,
    TolComplementarity,
    TolInfeas,
    KktSigma,
    KktPivotTol,
    CheckTermination,
}

impl SolverOption {
    pub const ALL: [SolverOption; 11] = [
        SolverOption::MaxIter,
        SolverOption::Verbose,
        SolverOption::Rho,
        SolverOption::TolPrimal,
        SolverOption::TolDual,
        SolverOption::TolStationarity,
        SolverOption::TolComplementarity,
        SolverOption::TolInfeas,
        SolverOption::KktSigma,
        SolverOption::KktPivotTol,
        SolverOption::CheckTermination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverOption::MaxIter => "max_iter",
            SolverOption::Verbose => "verbose",
            SolverOption::Rho => "rho",
            SolverOption::TolPrimal => "tol_primal",
            SolverOption::TolDual => "tol_dual",
            SolverOption::TolStationarity => "tol_stationarity",
            SolverOption::TolComplementarity => "tol_complementarity",
            SolverOption::TolInfeas => "tol_infeas",
            SolverOption::KktSigma => "kkt_sigma",
            SolverOption::KktPivotTol => "kkt_pivot_tol",
            SolverOption::CheckTermination => "check_termination",
        }
    }

    /// true for options holding an integer (or boolean) value
    pub fn is_int(&self) -> bool {
        matches!(
            self,
            SolverOption::MaxIter | SolverOption::Verbose | SolverOption::CheckTermination
        )
    }
}

impl std::fmt::Display for SolverOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SolverOption {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverOption::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or(SettingsError::BadFieldValue("option name"))
    }
}

impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Writes a floating point option.  The settings are unchanged on failure.
    pub fn set_option_float(&mut self, option: SolverOption, value: T) -> Result<(), SettingsError> {
        let mut new = self.clone();
        let field = match option {
            SolverOption::Rho => &mut new.rho,
            SolverOption::TolPrimal => &mut new.tol_primal,
            SolverOption::TolDual => &mut new.tol_dual,
            SolverOption::TolStationarity => &mut new.tol_stationarity,
            SolverOption::TolComplementarity => &mut new.tol_complementarity,
            SolverOption::TolInfeas => &mut new.tol_infeas,
            SolverOption::KktSigma => &mut new.kkt_sigma,
            SolverOption::KktPivotTol => &mut new.kkt_pivot_tol,
            _ => return Err(SettingsError::BadFieldKind(option.as_str())),
        };
        *field = value;
        new.validate()?;
        *self = new;
        Ok(())
    }

    /// Writes an integer option.  `verbose` takes `0` or `1`.
    /// The settings are unchanged on failure.
    pub fn set_option_int(&mut self, option: SolverOption, value: i64) -> Result<(), SettingsError> {
        let bad = SettingsError::BadFieldValue(option.as_str());
        match option {
            SolverOption::MaxIter => {
                let v = u32::try_from(value).map_err(|_| bad)?;
                validate_count("max_iter", v)?;
                self.max_iter = v;
            }
            SolverOption::CheckTermination => {
                let v = u32::try_from(value).map_err(|_| bad)?;
                validate_count("check_termination", v)?;
                self.check_termination = v;
            }
            SolverOption::Verbose => {
                self.verbose = match value {
                    0 => false,
                    1 => true,
                    _ => return Err(bad),
                };
            }
            _ => return Err(SettingsError::BadFieldKind(option.as_str())),
        }
        Ok(())
    }

    pub fn get_option_float(&self, option: SolverOption) -> Result<T, SettingsError> {
        match option {
            SolverOption::Rho => Ok(self.rho),
            SolverOption::TolPrimal => Ok(self.tol_primal),
            SolverOption::TolDual => Ok(self.tol_dual),
            SolverOption::TolStationarity => Ok(self.tol_stationarity),
            SolverOption::TolComplementarity => Ok(self.tol_complementarity),
            SolverOption::TolInfeas => Ok(self.tol_infeas),
            SolverOption::KktSigma => Ok(self.kkt_sigma),
            SolverOption::KktPivotTol => Ok(self.kkt_pivot_tol),
            _ => Err(SettingsError::BadFieldKind(option.as_str())),
        }
    }

    pub fn get_option_int(&self, option: SolverOption) -> Result<i64, SettingsError> {
        match option {
            SolverOption::MaxIter => Ok(self.max_iter.into()),
            SolverOption::CheckTermination => Ok(self.check_termination.into()),
            SolverOption::Verbose => Ok(self.verbose.into()),
            _ => Err(SettingsError::BadFieldKind(option.as_str())),
        }
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = DefaultSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings, DefaultSettings::default());
    assert_eq!(settings.tol_primal, 1e-4);

    // fail on nonpositive penalties or tolerances
    assert!(DefaultSettingsBuilder::<f64>::default()
        .rho(0.0)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f64>::default()
        .tol_dual(f64::NAN)
        .build()
        .is_err());
    assert!(DefaultSettingsBuilder::<f32>::default()
        .max_iter(0)
        .build()
        .is_err());

    // directly construct a bad DefaultSettings and manually check
    let settings = DefaultSettings::<f64> {
        kkt_sigma: -1.0,
        ..DefaultSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("kkt_sigma"))
    );
}

#[test]
fn test_option_access() {
    let mut settings = DefaultSettings::<f64>::default();

    for opt in SolverOption::ALL {
        assert_eq!(opt.as_str().parse::<SolverOption>(), Ok(opt));
        assert_eq!(opt.is_int(), settings.get_option_int(opt).is_ok());
        assert_eq!(!opt.is_int(), settings.get_option_float(opt).is_ok());
    }
    assert!("penalty".parse::<SolverOption>().is_err());

    settings.set_option_float(SolverOption::Rho, 10.0).unwrap();
    assert_eq!(settings.get_option_float(SolverOption::Rho), Ok(10.0));
    settings.set_option_int(SolverOption::Verbose, 1).unwrap();
    assert!(settings.verbose);

    // wrong kinds and bad values leave the settings untouched
    let before = settings.clone();
    assert_eq!(
        settings.set_option_int(SolverOption::Rho, 1),
        Err(SettingsError::BadFieldKind("rho"))
    );
    assert!(settings.set_option_float(SolverOption::MaxIter, 1.0).is_err());
    assert!(settings.set_option_float(SolverOption::TolPrimal, -1.0).is_err());
    assert!(settings.set_option_int(SolverOption::MaxIter, -3).is_err());
    assert!(settings.set_option_int(SolverOption::Verbose, 2).is_err());
    assert_eq!(settings, before);
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_serde() {
    let settings = DefaultSettingsBuilder::<f64>::default()
        .max_iter(25)
        .rho(0.1)
        .build()
        .unwrap();
    let json = serde_json::to_string(&settings).unwrap();
    let back: DefaultSettings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);

    // missing fields take defaults
    let partial: DefaultSettings<f64> = serde_json::from_str(r#"{"max_iter": 7}"#).unwrap();
    assert_eq!(partial.max_iter, 7);
    assert_eq!(partial.rho, 1.0);
}
