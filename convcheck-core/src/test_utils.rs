//! Shared helpers for unit tests.

use convcheck_test_support::proptest_profile::PropertyProfile;
use proptest::test_runner::Config as ProptestConfig;

/// Proptest configuration honouring the case-count override.
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = PropertyProfile::load(default_cases);
    ProptestConfig {
        cases: profile.cases(),
        ..ProptestConfig::default()
    }
}
