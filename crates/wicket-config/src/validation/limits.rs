//! Validation for browser start-up and window limits.

use crate::schema::WicketConfig;

use super::helpers::validate_range;

pub(crate) fn validate_browser(errors: &mut Vec<String>, config: &WicketConfig) {
    validate_range(
        errors,
        "browser.startup_timeout",
        config.browser.startup_timeout,
        1,
        600,
    );
}

pub(crate) fn validate_windows(errors: &mut Vec<String>, config: &WicketConfig) {
    validate_range(
        errors,
        "windows.max_windows",
        config.windows.max_windows,
        2,
        4096,
    );
}
