use log::{Level, LevelFilter};

use crate::currency::CurrencyCode;

pub const CURRENCY_META: &str = "app-currency";
pub const LOG_LEVEL_META: &str = "app-log-level";

/// Settings the server hands to the page scripts through `<meta>` tags.
#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub currency: CurrencyCode,
    pub log_level: LevelFilter,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::INR,
            log_level: LevelFilter::Info,
        }
    }
}

/// A setting that was present but unusable, kept so it can be logged once
/// the logger is up.
#[derive(Clone, Debug, PartialEq)]
pub struct Ignored {
    pub name: &'static str,
    pub value: String,
}

impl PageConfig {
    /// Builds the config from a `<meta name=...>` lookup.
    ///
    /// Missing or malformed values fall back to the defaults.
    pub fn from_meta<F>(lookup: F) -> (PageConfig, Vec<Ignored>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PageConfig::default();
        let mut ignored = Vec::new();

        if let Some(raw) = lookup(CURRENCY_META) {
            match CurrencyCode::parse(&raw) {
                Some(code) => config.currency = code,
                None => ignored.push(Ignored {
                    name: CURRENCY_META,
                    value: raw,
                }),
            }
        }

        if let Some(raw) = lookup(LOG_LEVEL_META) {
            match raw.trim().parse::<LevelFilter>() {
                Ok(level) => config.log_level = level,
                Err(_) => ignored.push(Ignored {
                    name: LOG_LEVEL_META,
                    value: raw,
                }),
            }
        }

        (config, ignored)
    }

    /// The level to install the console logger at; `None` when logging is
    /// switched off.
    pub fn console_level(&self) -> Option<Level> {
        self.log_level.to_level()
    }
}
