//! The generation pipeline.
//!
//! One run goes: select input → validate instructions → check the model
//! client → load text (read a file, or fetch and extract a page) → build
//! the prompt → one model call → parse → thesis convention → naming.
//!
//! The pipeline never writes files; [`crate::writer::write_outputs`] is a
//! separate step, so a failed run leaves nothing behind.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use newsdesk_core::{CannedClient, GenerationRequest, HttpFetcher, FetchConfig, Pipeline, Settings};
//!
//! let llm = CannedClient::new("Title: A title\nText: A body.");
//! let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
//! let settings = Settings::default();
//! let pipeline = Pipeline::new(&llm, &fetcher, &settings);
//!
//! // Neither a file nor a URL, and no default file: rejected before any call.
//! let request = GenerationRequest::new(NaiveDate::from_ymd_opt(2025, 1, 7).unwrap());
//! assert!(pipeline.run(&request).is_err());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::{Language, Settings};
use crate::extract::{ExtractConfig, extract_main_text};
use crate::fetch::{Fetcher, read_source_file, validate_url};
use crate::llm::LlmClient;
use crate::naming::{ArticleNaming, ThesisInfo, detect_thesis};
use crate::prompt::{build_prompt, validate_instructions};
use crate::response::{GeneratedArticle, ResponseGrammar};
use crate::{NewsdeskError, Result};

/// Where the source text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Url(String),
}

impl InputSource {
    /// Picks the input from the two flags and the configured default file.
    ///
    /// Exactly one flag selects that input; neither falls back to
    /// `default_file`.
    ///
    /// # Errors
    ///
    /// [`NewsdeskError::InvalidInputSelection`] when both flags are given, or
    /// when neither is and there is no default.
    pub fn select(file: Option<&Path>, url: Option<&str>, default_file: Option<&Path>) -> Result<Self> {
        match (file, url) {
            (Some(_), Some(_)) => Err(NewsdeskError::InvalidInputSelection { both: true }),
            (Some(path), None) => Ok(Self::File(path.to_path_buf())),
            (None, Some(url)) => Ok(Self::Url(url.trim().to_string())),
            (None, None) => default_file
                .map(|path| Self::File(path.to_path_buf()))
                .ok_or(NewsdeskError::InvalidInputSelection { both: false }),
        }
    }

    pub fn source_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url.as_str()),
            Self::File(_) => None,
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Url(url) => write!(f, "url {}", url),
        }
    }
}

/// Per-run options.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub input_file: Option<PathBuf>,
    pub url: Option<String>,
    /// Free-text instructions appended to the prompt.
    pub instructions: Option<String>,
    /// "Today" for the date stamp.
    pub today: NaiveDate,
}

impl GenerationRequest {
    pub fn new(today: NaiveDate) -> Self {
        Self { input_file: None, url: None, instructions: None, today }
    }

    pub fn input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        self.instructions = Some(text.into());
        self
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Generation {
    pub source: InputSource,
    pub source_text: String,
    pub article: GeneratedArticle,
    pub thesis: Option<ThesisInfo>,
    pub naming: ArticleNaming,
}

/// Sequences the stages over borrowed collaborators.
pub struct Pipeline<'a> {
    llm: &'a dyn LlmClient,
    fetcher: &'a dyn Fetcher,
    grammar: ResponseGrammar,
    language: Language,
    extract: ExtractConfig,
    default_file: Option<PathBuf>,
}

impl<'a> Pipeline<'a> {
    pub fn new(llm: &'a dyn LlmClient, fetcher: &'a dyn Fetcher, settings: &Settings) -> Self {
        Self {
            llm,
            fetcher,
            grammar: ResponseGrammar::default(),
            language: settings.language,
            extract: ExtractConfig::default(),
            default_file: settings.input_file.clone(),
        }
    }

    pub fn with_grammar(mut self, grammar: ResponseGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract = config;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn run(&self, request: &GenerationRequest) -> Result<Generation> {
        let source = InputSource::select(
            request.input_file.as_deref(),
            request.url.as_deref(),
            self.default_file.as_deref(),
        )?;
        tracing::info!(%source, "input selected");

        let instructions = validate_instructions(request.instructions.as_deref())?;
        self.llm.check()?;

        let source_text = self.load(&source)?;
        let source_url = source.source_url();

        let prompt = build_prompt(&source_text, instructions.as_deref(), source_url, self.language);
        tracing::debug!(chars = prompt.len(), client = self.llm.name(), "prompt built");

        let reply = self.llm.complete(&prompt)?;
        let mut article = self.grammar.parse(&reply, source_url)?;

        let thesis = detect_thesis(&article.title, &article.body, &source_text);
        if let Some(info) = &thesis {
            info.apply(&mut article);
        }

        let naming = ArticleNaming::derive(&article, thesis.as_ref(), request.today);
        tracing::info!(news = %naming.news_file_name(), thesis = naming.is_thesis, "article generated");

        Ok(Generation { source, source_text, article, thesis, naming })
    }

    fn load(&self, source: &InputSource) -> Result<String> {
        match source {
            InputSource::File(path) => read_source_file(path),
            InputSource::Url(url) => {
                validate_url(url)?;
                let html = self.fetcher.fetch(url)?;
                extract_main_text(&html, url, &self.extract)
            }
        }
    }
}
