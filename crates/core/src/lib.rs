pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod llm;
pub mod naming;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod prompt;
pub mod response;
pub mod scoring;
pub mod text;
pub mod writer;

pub use config::{Language, Settings};
pub use error::{NewsdeskError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, Strategy};
pub use extract::{extract_main_text, extract_with_strategy};
pub use fetch::{FetchConfig, Fetcher, HttpFetcher, read_source_file, validate_url};
pub use history::{PostFile, posts_for_url, recent_posts};
pub use llm::{CannedClient, GeminiClient, LlmClient};
pub use naming::{
    ArticleNaming, DEFAULT_SLUG_WORDS, ThesisInfo, date_stamp, detect_thesis, extract_person_names, next_business_day,
    slugify,
};
pub use parse::Document;
pub use pipeline::{Generation, GenerationRequest, InputSource, Pipeline};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use prompt::{Labels, Prompt, build_prompt, validate_instructions};
pub use response::{GeneratedArticle, ResponseGrammar, SectionKind, SectionRule};
#[doc(hidden)]
pub use scoring::{ScoreConfig, ScoreResult, calculate_score, link_density};
pub use text::{element_to_text, html_to_text};
pub use writer::{OutputFiles, render_article, write_outputs};
