use hifitime::Epoch;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    constants::{Days, JDTOMJD, MJD, T2000},
    orrery_errors::OrreryError,
};

/// Transformation from a date in the format YYYY-MM-ddTHH:mm:ss (UTC) to modified julian date (MJD)
///
/// Argument
/// --------
/// * `date`: a date string understood by [`hifitime::Epoch`]
///
/// Return
/// ------
/// * the input date in MJD, or [`OrreryError::InvalidDate`] if it cannot be parsed
pub fn date_to_mjd(date: &str) -> Result<MJD, OrreryError> {
    Epoch::from_str(date)
        .map(|epoch| epoch.to_mjd_utc_days())
        .map_err(|err| OrreryError::InvalidDate(format!("{date}: {err}")))
}

/// Vectorized version of [`date_to_mjd`]; fails on the first unparsable entry.
pub fn dates_to_mjd(dates: &[&str]) -> Result<Vec<MJD>, OrreryError> {
    dates.iter().map(|d| date_to_mjd(d)).collect()
}

/// Build the [`Epoch`] matching a modified julian date (UTC).
pub fn mjd_to_epoch(mjd: MJD) -> Epoch {
    Epoch::from_mjd_utc(mjd)
}

/// Modified julian date (UTC) of an [`Epoch`].
pub fn epoch_to_mjd(epoch: &Epoch) -> MJD {
    epoch.to_mjd_utc_days()
}

/// Render a modified julian date as an ISO 8601 string.
pub fn format_mjd(mjd: MJD) -> String {
    format!("{}", mjd_to_epoch(mjd))
}

/// Elapsed days between the J2000 epoch and `mjd` (negative before J2000).
#[inline]
pub fn days_since_j2000(mjd: MJD) -> Days {
    mjd - T2000
}

/// Transformation from julian date (JD) to modified julian date (MJD)
#[inline]
pub fn jd_to_mjd(jd: f64) -> MJD {
    jd - JDTOMJD
}

/// Transformation from modified julian date (MJD) to julian date (JD)
#[inline]
pub fn mjd_to_jd(mjd: MJD) -> f64 {
    mjd + JDTOMJD
}

/// Direction in which simulated time flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeDirection {
    #[default]
    Forward,
    Backward,
}

impl TimeDirection {
    /// `+1.0` forward, `-1.0` backward.
    pub fn sign(self) -> f64 {
        match self {
            TimeDirection::Forward => 1.0,
            TimeDirection::Backward => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            TimeDirection::Forward => TimeDirection::Backward,
            TimeDirection::Backward => TimeDirection::Forward,
        }
    }
}
