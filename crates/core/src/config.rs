//! Process-wide settings resolved once at start-up.
//!
//! [`Settings`] gathers the environment-supplied defaults (input file, output
//! directory, social-post directory, model credentials and language). It is
//! built a single time by the binary and handed to each component; nothing in
//! the core reads the process environment on its own.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::{Language, Settings};
//!
//! let settings = Settings::from_lookup(|key| match key {
//!     "NEWS_OUTPUT_DIR" => Some("/tmp/news".to_string()),
//!     "NEWS_LANGUAGE" => Some("en".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(settings.language, Language::En);
//! assert!(settings.api_key.is_none());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{NewsdeskError, Result};

pub const ENV_INPUT_FILE: &str = "NEWS_INPUT_FILE";
pub const ENV_OUTPUT_DIR: &str = "NEWS_OUTPUT_DIR";
pub const ENV_POSTS_DIR: &str = "BLUESKY_POSTS_DIR";
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_MODEL: &str = "NEWS_MODEL";
pub const ENV_API_BASE: &str = "NEWS_API_BASE";
pub const ENV_LANGUAGE: &str = "NEWS_LANGUAGE";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Working language of the generated article.
///
/// Drives the system prompt, the labels written to the news file and the
/// stopword list used when building slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// Spanish (`Título:` / `Texto:` / `Enlaces:`).
    #[default]
    Es,
    /// English (`Title:` / `Text:` / `Links:`).
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = NewsdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "es" | "spa" | "spanish" | "español" | "espanol" => Ok(Self::Es),
            "en" | "eng" | "english" => Ok(Self::En),
            other => Err(NewsdeskError::Config(format!(
                "unknown language '{}'. Valid options: es, en",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Defaults read from the environment (or a `.env` file loaded by the binary).
///
/// Every field can be overridden by a command-line flag.
#[derive(Clone, Default)]
pub struct Settings {
    /// Input file used when neither a file nor a URL is passed.
    pub input_file: Option<PathBuf>,
    /// Directory where generated files are written. `None` prints only.
    pub output_dir: Option<PathBuf>,
    /// Directory holding previously written `_blsky.txt` posts.
    pub posts_dir: Option<PathBuf>,
    /// Credential for the model API.
    pub api_key: Option<String>,
    /// Model name passed to the API.
    pub model: String,
    /// Base URL of the model API.
    pub api_base: String,
    /// Working language.
    pub language: Language,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_language(None)
    }

    /// Like [`Settings::from_env`], but a given `language` wins and
    /// `NEWS_LANGUAGE` is not parsed at all.
    pub fn from_env_with_language(language: Option<Language>) -> Result<Self> {
        Self::from_lookup_with_language(|key| std::env::var(key).ok(), language)
    }

    /// Reads the settings through an arbitrary lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_language(lookup, None)
    }

    pub fn from_lookup_with_language<F>(lookup: F, language: Option<Language>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let language = match (language, get(ENV_LANGUAGE)) {
            (Some(language), _) => language,
            (None, Some(code)) => code.parse()?,
            (None, None) => Language::default(),
        };

        Ok(Self {
            input_file: get(ENV_INPUT_FILE).map(PathBuf::from),
            output_dir: get(ENV_OUTPUT_DIR).map(PathBuf::from),
            posts_dir: get(ENV_POSTS_DIR).map(PathBuf::from),
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: get(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            language,
        })
    }

    /// Directory searched for earlier posts: the posts directory, else the output directory.
    pub fn history_dir(&self) -> Option<&PathBuf> {
        self.posts_dir.as_ref().or(self.output_dir.as_ref())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("input_file", &self.input_file)
            .field("output_dir", &self.output_dir)
            .field("posts_dir", &self.posts_dir)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("language", &self.language)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert!(settings.input_file.is_none());
        assert!(settings.output_dir.is_none());
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.language, Language::Es);
    }

    #[test]
    fn test_reads_all_keys() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_INPUT_FILE, "/tmp/noticia.txt"),
            (ENV_OUTPUT_DIR, "/tmp/out"),
            (ENV_POSTS_DIR, "/tmp/posts"),
            (ENV_API_KEY, "secret-key"),
            (ENV_MODEL, "gemini-2.0-flash"),
            (ENV_LANGUAGE, "EN"),
        ]))
        .unwrap();

        assert_eq!(settings.input_file, Some(PathBuf::from("/tmp/noticia.txt")));
        assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(settings.history_dir(), Some(&PathBuf::from("/tmp/posts")));
        assert_eq!(settings.api_key.as_deref(), Some("secret-key"));
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(settings.language, Language::En);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let settings = Settings::from_lookup(lookup_from(&[(ENV_OUTPUT_DIR, "   "), (ENV_API_KEY, "")])).unwrap();
        assert!(settings.output_dir.is_none());
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_history_dir_falls_back_to_output_dir() {
        let settings = Settings::from_lookup(lookup_from(&[(ENV_OUTPUT_DIR, "/tmp/out")])).unwrap();
        assert_eq!(settings.history_dir(), Some(&PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_unknown_language_is_config_error() {
        let result = Settings::from_lookup(lookup_from(&[(ENV_LANGUAGE, "klingon")]));
        assert!(matches!(result, Err(NewsdeskError::Config(_))));
    }

    #[test]
    fn test_language_override_skips_invalid_environment_value() {
        let settings =
            Settings::from_lookup_with_language(lookup_from(&[(ENV_LANGUAGE, "klingon")]), Some(Language::En))
                .unwrap();
        assert_eq!(settings.language, Language::En);

        let settings =
            Settings::from_lookup_with_language(lookup_from(&[(ENV_LANGUAGE, "en")]), Some(Language::Es)).unwrap();
        assert_eq!(settings.language, Language::Es);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = Settings::from_lookup(lookup_from(&[(ENV_API_KEY, "super-secret")])).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
