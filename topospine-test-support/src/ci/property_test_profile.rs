//! Property-test run profile read from the environment.
//!
//! Suites build their `proptest` configuration from one profile so CI can
//! raise case counts or enable forking without touching test code.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable enabling forked proptest execution.
pub const TOPOSPINE_PBT_FORK_ENV_KEY: &str = "TOPOSPINE_PBT_FORK";

/// Case count and fork mode for a property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the environment, keeping the defaults for unset
    /// or malformed values.
    ///
    /// # Examples
    ///
    /// ```
    /// use topospine_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_from_env(PROGTEST_CASES_ENV_KEY, default_cases, parse_cases),
            fork: override_from_env(TOPOSPINE_PBT_FORK_ENV_KEY, default_fork, parse_flag),
        }
    }

    /// Number of cases per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether cases run in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn override_from_env<T: Copy>(
    key: &'static str,
    default: T,
    parse: fn(&str) -> Result<T, String>,
) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        tracing::warn!(env = key, raw = %raw, reason = %reason, "ignoring property-test override");
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("cases must be > 0".to_owned()),
        Ok(cases) => Ok(cases),
        Err(error) => Err(format!("parse error: {error}")),
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("unrecognised flag {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(1))]
    #[case(" 250 ", Ok(250))]
    #[case("0", Err(()))]
    #[case("-3", Err(()))]
    #[case("many", Err(()))]
    fn parses_case_counts(#[case] raw: &str, #[case] expected: Result<u32, ()>) {
        assert_eq!(parse_cases(raw).map_err(|_| ()), expected);
    }

    #[rstest]
    #[case("true", Ok(true))]
    #[case("ON", Ok(true))]
    #[case("1", Ok(true))]
    #[case("no", Ok(false))]
    #[case("0", Ok(false))]
    #[case("", Err(()))]
    #[case("2", Err(()))]
    fn parses_fork_flags(#[case] raw: &str, #[case] expected: Result<bool, ()>) {
        assert_eq!(parse_flag(raw).map_err(|_| ()), expected);
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let cases = override_from_env("TOPOSPINE_TEST_SUPPORT_UNSET_KEY", 17, parse_cases);
        assert_eq!(cases, 17);
    }
}
