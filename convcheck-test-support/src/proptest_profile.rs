//! Environment-driven tuning for property tests.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROPTEST_CASES_ENV_KEY: &str = "CONVCHECK_PROPTEST_CASES";

/// Case count for one property-test suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyProfile {
    cases: u32,
}

impl PropertyProfile {
    /// Reads the override from the environment, falling back to
    /// `default_cases` when it is absent or invalid.
    ///
    /// # Examples
    /// ```
    /// use convcheck_test_support::proptest_profile::PropertyProfile;
    ///
    /// assert!(PropertyProfile::load(32).cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32) -> Self {
        let cases = match env::var(PROPTEST_CASES_ENV_KEY) {
            Ok(raw) => parse_cases(&raw).unwrap_or_else(|reason| {
                tracing::warn!(
                    env = PROPTEST_CASES_ENV_KEY,
                    raw = %raw,
                    reason = %reason,
                    "invalid property-test case override; using default",
                );
                default_cases
            }),
            Err(_) => default_cases,
        };
        Self { cases }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(self) -> u32 {
        self.cases
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    let parsed = raw
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("parse error: {error}"))?;
    if parsed == 0 {
        return Err("cases must be > 0".to_owned());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("16", 16)]
    #[case(" 256 ", 256)]
    fn parse_cases_accepts_positive_counts(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(parse_cases(raw), Ok(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("many")]
    fn parse_cases_rejects_invalid_counts(#[case] raw: &str) {
        assert!(parse_cases(raw).is_err());
    }
}
