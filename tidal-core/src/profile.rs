//! Activity profiles: wall-clock time in, "how busy should we be" out.
//!
//! Every profile is a pure function of the instant it is given. Two calls with
//! the same instant always return the same level, which is what lets the
//! reporter's logged level be compared against the pacing workers applied.
mod global_enterprise;
mod local_office;
mod store_global;
mod store_regional;
mod window;

pub use global_enterprise::GlobalEnterprise;
pub use local_office::LocalOffice;
pub use store_global::StoreGlobal;
pub use store_regional::StoreRegional;

use crate::{ConfigError, MAX_ACTIVITY_LEVEL};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Names accepted by [`Profile::from_name`].
pub const PROFILE_NAMES: &[&str] = &[
    "local-office",
    "global-enterprise",
    "store-regional",
    "store-global",
    "constant",
];

pub trait ActivityProfile: Send + Sync {
    /// Activity level at `at`, nominally in `[0, 1]`. Store profiles may exceed 1.0 on weekends.
    fn activity_level(&self, at: DateTime<Utc>) -> f64;
}

/// The profiles a run can be configured with.
#[derive(Clone, Debug, PartialEq)]
pub enum Profile {
    LocalOffice(LocalOffice),
    GlobalEnterprise(GlobalEnterprise),
    StoreRegional(StoreRegional),
    StoreGlobal(StoreGlobal),
    /// The same level around the clock.
    Fixed(f64),
}

impl Profile {
    /// Resolves a profile by name. The timezone is parsed for every profile, so
    /// a bad timezone is rejected even when the chosen profile works in UTC.
    pub fn from_name(name: &str, timezone: &str) -> Result<Self, ConfigError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(timezone.to_string()))?;

        match name {
            "local-office" => Ok(Self::LocalOffice(LocalOffice::new(tz))),
            "global-enterprise" => Ok(Self::GlobalEnterprise(GlobalEnterprise)),
            "store-regional" => Ok(Self::StoreRegional(StoreRegional::new(tz))),
            "store-global" => Ok(Self::StoreGlobal(StoreGlobal)),
            "constant" => Ok(Self::Fixed(1.0)),
            _ => Err(ConfigError::UnknownProfile(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalOffice(_) => "local-office",
            Self::GlobalEnterprise(_) => "global-enterprise",
            Self::StoreRegional(_) => "store-regional",
            Self::StoreGlobal(_) => "store-global",
            Self::Fixed(_) => "constant",
        }
    }
}

impl ActivityProfile for Profile {
    fn activity_level(&self, at: DateTime<Utc>) -> f64 {
        match self {
            Self::LocalOffice(p) => p.activity_level(at),
            Self::GlobalEnterprise(p) => p.activity_level(at),
            Self::StoreRegional(p) => p.activity_level(at),
            Self::StoreGlobal(p) => p.activity_level(at),
            Self::Fixed(level) if level.is_finite() => level.clamp(0.0, MAX_ACTIVITY_LEVEL),
            Self::Fixed(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn every_quarter_hour_of_a_week() -> impl Iterator<Item = DateTime<Utc>> {
        // 2024-01-01 is a Monday.
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..7 * 24 * 4).map(move |step| start + Duration::minutes(15 * step))
    }

    fn all_profiles() -> Vec<Profile> {
        PROFILE_NAMES
            .iter()
            .map(|name| Profile::from_name(name, "Europe/Berlin").unwrap())
            .collect()
    }

    #[test]
    fn levels_stay_in_bounds() {
        for profile in all_profiles() {
            for at in every_quarter_hour_of_a_week() {
                let level = profile.activity_level(at);
                assert!(
                    (0.0..=MAX_ACTIVITY_LEVEL).contains(&level),
                    "{} returned {level} at {at}",
                    profile.name()
                );
            }
        }
    }

    #[test]
    fn levels_are_deterministic() {
        for profile in all_profiles() {
            for at in every_quarter_hour_of_a_week() {
                assert_eq!(profile.activity_level(at), profile.activity_level(at));
            }
        }
    }

    #[test]
    fn resolves_names() {
        for name in PROFILE_NAMES {
            let profile = Profile::from_name(name, "UTC").unwrap();
            assert_eq!(profile.name(), *name);
        }
    }

    #[test]
    fn non_finite_fixed_level_is_idle() {
        let at = Utc::now();
        assert_eq!(Profile::Fixed(f64::NAN).activity_level(at), 0.0);
        assert_eq!(Profile::Fixed(f64::INFINITY).activity_level(at), 0.0);
        assert_eq!(Profile::Fixed(3.0).activity_level(at), MAX_ACTIVITY_LEVEL);
    }

    #[test]
    fn rejects_unknown_profile() {
        assert_eq!(
            Profile::from_name("night-shift", "UTC"),
            Err(ConfigError::UnknownProfile("night-shift".to_string()))
        );
    }

    #[test]
    fn rejects_bad_timezone() {
        assert_eq!(
            Profile::from_name("global-enterprise", "Mars/Olympus_Mons"),
            Err(ConfigError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
    }
}
