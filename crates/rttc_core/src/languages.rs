//! crates/rttc_core/src/languages.rs
//!
//! The languages offered by the language pickers and their speech locales.

/// A language the app offers in its pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
    pub locale: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language {
        code: "pt",
        label: "Português",
        locale: "pt-PT",
    },
    Language {
        code: "en",
        label: "English",
        locale: "en-US",
    },
    Language {
        code: "es",
        label: "Español",
        locale: "es-ES",
    },
    Language {
        code: "fr",
        label: "Français",
        locale: "fr-FR",
    },
    Language {
        code: "de",
        label: "Deutsch",
        locale: "de-DE",
    },
    Language {
        code: "it",
        label: "Italiano",
        locale: "it-IT",
    },
];

/// Used whenever no better locale is known.
pub const DEFAULT_LOCALE: &str = "pt-PT";

/// Speech locale for a two-letter code, falling back to [`DEFAULT_LOCALE`].
pub fn locale_for(code: &str) -> &'static str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.code.eq_ignore_ascii_case(code))
        .map(|language| language.locale)
        .unwrap_or(DEFAULT_LOCALE)
}

/// True for a lowercase two-letter ISO 639-1 style code.
pub fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())
}
