use std::fmt;

use dialoguer::theme::ColorfulTheme;
use intake_config::Config;

use crate::cli::output::{self, OutputPreferences};

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

/// Applies the display settings stored in `config`.
pub fn apply_config(config: &Config) {
    output::set_preferences(OutputPreferences {
        plain_output: config.plain_output,
        high_contrast: config.high_contrast,
    });
}

/// Prompt theme for dialoguer widgets.
pub fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}
