//! Shared proptest configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use devconsole_testing::proptest_config;
//!
//! proptest! {
//!     #![proptest_config(proptest_config::auto_config())]
//!
//!     #[test]
//!     fn my_property(x in 0..100i32) {
//!         // ...
//!     }
//! }
//! ```
//!
//! Set `PROPTEST_CASES` to control thoroughness (64 for PRs, thousands nightly).

use proptest::prelude::*;

/// Case count from `PROPTEST_CASES`, 256 when unset
pub fn auto_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(256);

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}
