//! File naming: business-day date stamps, slugs and the thesis convention.
//!
//! Output files are named `<date>-<slug>.txt` and `<date>-<slug>_blsky.txt`,
//! where the date is the next business day and the slug is a short ASCII
//! form of the article title.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use newsdesk_core::naming::{DEFAULT_SLUG_WORDS, next_business_day, slugify};
//!
//! let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! assert_eq!(next_business_day(friday).to_string(), "2025-01-13");
//!
//! let slug = slugify("Nuevo hallazgo arqueológico en Aragón", DEFAULT_SLUG_WORDS);
//! assert_eq!(slug, "nuevo-hallazgo-arqueologico-aragon");
//! ```

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::Language;
use crate::response::GeneratedArticle;

/// Keyword budget of a title slug.
pub const DEFAULT_SLUG_WORDS: usize = 4;

/// Keywords taken from a thesis title after the author's name.
pub const THESIS_SLUG_WORDS: usize = 2;

const FALLBACK_SLUG: &str = "article";

const STOPWORDS: &[&str] = &[
    // es
    "a", "al", "ante", "como", "con", "de", "del", "desde", "e", "el", "en", "entre", "es", "hasta", "la", "las", "lo",
    "los", "o", "para", "por", "que", "se", "sin", "sobre", "su", "sus", "tras", "u", "un", "una", "unas", "unos", "y",
    // en
    "about", "an", "and", "as", "at", "by", "for", "from", "in", "into", "is", "its", "of", "on", "or", "the", "to",
    "with",
];

/// Capitalised words that start sentences or name the event, never a person.
const NOT_NAMES: &[&str] = &[
    "el", "la", "los", "las", "un", "una", "the", "a", "an", "this", "este", "esta", "tesis", "doctoral", "doctorado",
    "lectura", "defensa", "thesis", "defense", "defence", "dissertation", "doctor", "doctora", "universidad",
    "university", "facultad", "faculty", "escuela", "school", "departamento", "department", "instituto", "institute",
    "programa", "grupo", "centro", "premio", "nuevo", "nueva", "new", "lunes", "martes", "miércoles", "jueves",
    "viernes", "sábado", "domingo", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre", "noviembre",
    "diciembre", "january", "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december",
];

/// One capitalised name word, optionally hyphenated (`Ruiz-Gómez`).
const NAME_WORD: &str = r"\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?";

static HONORIFIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\b(?:Dra?|Profa?|Mrs?|Ms|Sra?|Dña|D)\.|\b(?:Doctora?|Profesora?)\b)[ \t]*(?P<name>\b{w}(?:[ \t]+{w})*\b)",
        w = NAME_WORD
    ))
    .unwrap()
});

static CONNECTOR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:de|del|of|by|por)[ \t]+(?P<name>\b{w}(?:[ \t]+{w})*\b)", w = NAME_WORD)).unwrap()
});

static CAPITALIZED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?P<name>\b{w}(?:[ \t]+{w})*\b)", w = NAME_WORD)).unwrap());

static THESIS_ES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tesis\s+doctoral|lectura\s+de\s+(?:la\s+)?tesis|defensa\s+de\s+(?:la\s+)?tesis)\b").unwrap()
});

static THESIS_EN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bph\.?\s?d\.?\s+(?:thesis|dissertation)|\bdoctoral\s+(?:thesis|dissertation)|\b(?:thesis|dissertation)\s+defen[cs]e)\b",
    )
    .unwrap()
});

/// The topic named after the thesis keyword in the same sentence:
/// "tesis doctoral sobre X", "thesis on X", "dissertation titled X".
static THESIS_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:tesis|thesis|dissertation)\b[^.\n]*?\b(?:sobre|acerca\s+de|titulada|titulado|titled|entitled|about|on)\s+(?P<topic>[^.\n,;:]+)",
    )
    .unwrap()
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?P<a>[^"\n]{3,})"|“(?P<b>[^”\n]{3,})”|«(?P<c>[^»\n]{3,})»"#).unwrap());

/// The next Monday-to-Friday day strictly after `date`.
///
/// No holiday calendar is applied.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    date.iter_days()
        .skip(1)
        .find(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(date)
}

/// `YYYY-MM-DD`.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Lowercase ASCII tokens of `text`: diacritics stripped, punctuation
/// deleted, whitespace, `-` and `_` as separators.
fn fold_tokens(text: &str) -> Vec<String> {
    let mut folded = String::with_capacity(text.len());

    for c in text.to_lowercase().nfkd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'œ' => folded.push_str("oe"),
            'ø' => folded.push('o'),
            'ł' => folded.push('l'),
            'đ' => folded.push('d'),
            c if c.is_ascii_alphanumeric() => folded.push(c),
            c if c.is_whitespace() || c == '-' || c == '_' => folded.push(' '),
            _ => {}
        }
    }

    folded.split_whitespace().map(str::to_string).collect()
}

/// Filesystem-safe slug of at most `max_words` hyphen-separated keywords.
///
/// Stopwords are dropped unless nothing else is left. Applying it twice
/// gives the same result.
pub fn slugify(text: &str, max_words: usize) -> String {
    let tokens = fold_tokens(text);
    let keywords: Vec<&String> = tokens.iter().filter(|t| !STOPWORDS.contains(&t.as_str())).collect();

    let chosen: Vec<&str> = if keywords.is_empty() {
        tokens.iter().map(String::as_str).take(max_words).collect()
    } else {
        keywords.into_iter().map(String::as_str).take(max_words).collect()
    };

    chosen.join("-")
}

/// Splits a capitalised run at words that cannot be part of a name and
/// keeps the pieces with at least two words.
fn name_runs(sequence: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in sequence.split_whitespace() {
        if NOT_NAMES.contains(&word.to_lowercase().as_str()) {
            if current.len() >= 2 {
                runs.push(current.join(" "));
            }
            current.clear();
        } else {
            current.push(word);
        }
    }
    if current.len() >= 2 {
        runs.push(current.join(" "));
    }

    runs
}

/// Best-effort person names, most reliable first.
///
/// Names after an honorific (`Dr.`, `Dra.`, `Prof.`, `Mr.`, `Sra.`, ...)
/// come first, then names after `de`/`of`/`by`/`por`, then any other run of
/// two or more capitalised words. Every name has at least two words.
pub fn extract_person_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for regex in [&*HONORIFIC_NAME, &*CONNECTOR_NAME, &*CAPITALIZED_NAME] {
        for caps in regex.captures_iter(text) {
            for name in name_runs(&caps["name"]) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    names
}

fn thesis_language(text: &str) -> Option<Language> {
    if THESIS_ES.is_match(text) {
        Some(Language::Es)
    } else if THESIS_EN.is_match(text) {
        Some(Language::En)
    } else {
        None
    }
}

fn first_quoted(text: &str) -> Option<String> {
    QUOTED.captures(text).and_then(|caps| {
        ["a", "b", "c"]
            .iter()
            .find_map(|group| caps.name(group))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn thesis_topic(text: &str) -> Option<String> {
    let topic = THESIS_TOPIC.captures(text)?.name("topic")?.as_str().trim();
    let mut chars = topic.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// A detected thesis-defence announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThesisInfo {
    /// Language of the matched keyword; picks the title template.
    pub language: Language,
    pub first_name: String,
    pub surname: String,
    /// Empty when the announcement names no thesis title.
    pub thesis_title: String,
}

impl ThesisInfo {
    /// `Lectura de Tesis de <Nombre> <Apellido>, "<Título>"` or
    /// `PhD Thesis Defense of <First> <Surname>, "<Title>"`.
    pub fn formatted_title(&self) -> String {
        let lead = match self.language {
            Language::Es => "Lectura de Tesis de",
            Language::En => "PhD Thesis Defense of",
        };
        if self.thesis_title.is_empty() {
            format!("{} {} {}", lead, self.first_name, self.surname)
        } else {
            format!("{} {} {}, \"{}\"", lead, self.first_name, self.surname, self.thesis_title)
        }
    }

    /// `<first>-<surname>-<thesis keywords>`.
    pub fn slug(&self) -> String {
        let mut parts = fold_tokens(&self.first_name);
        parts.extend(fold_tokens(&self.surname));
        let keywords = slugify(&self.thesis_title, THESIS_SLUG_WORDS);
        if !keywords.is_empty() {
            parts.push(keywords);
        }
        parts.join("-")
    }

    /// Rewrites the article title to the thesis template.
    pub fn apply(&self, article: &mut GeneratedArticle) {
        article.title = self.formatted_title();
    }
}

/// Looks for a thesis announcement in the generated title, the body and the
/// source text, in that order.
///
/// A keyword match alone is not enough: an author name must be found too.
/// The thesis title is the first quoted phrase, else the topic introduced
/// after the keyword ("sobre", "on", "titled"), else empty.
/// This is a heuristic and can miss atypical phrasing.
pub fn detect_thesis(title: &str, body: &str, source: &str) -> Option<ThesisInfo> {
    let texts = [title, body, source];

    let language = texts.iter().find_map(|t| thesis_language(t))?;
    let author = texts.iter().find_map(|t| extract_person_names(t).into_iter().next())?;

    let mut words = author.split_whitespace();
    let first_name = words.next()?.to_string();
    let surname = words.next()?.to_string();

    let thesis_title = texts
        .iter()
        .find_map(|t| first_quoted(t))
        .or_else(|| texts.iter().find_map(|t| thesis_topic(t)))
        .unwrap_or_default();

    tracing::debug!(%first_name, %surname, language = %language, "thesis announcement detected");

    Some(ThesisInfo { language, first_name, surname, thesis_title })
}

/// Date stamp and slug for one run's output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleNaming {
    /// `YYYY-MM-DD` of the next business day.
    pub date_stamp: String,
    pub slug: String,
    pub is_thesis: bool,
}

impl ArticleNaming {
    pub fn derive(article: &GeneratedArticle, thesis: Option<&ThesisInfo>, today: NaiveDate) -> Self {
        let slug = match thesis {
            Some(info) => info.slug(),
            None => slugify(&article.title, DEFAULT_SLUG_WORDS),
        };
        let slug = if slug.is_empty() { FALLBACK_SLUG.to_string() } else { slug };

        Self { date_stamp: date_stamp(next_business_day(today)), slug, is_thesis: thesis.is_some() }
    }

    pub fn news_file_name(&self) -> String {
        format!("{}-{}.txt", self.date_stamp, self.slug)
    }

    pub fn bluesky_file_name(&self) -> String {
        format!("{}-{}_blsky.txt", self.date_stamp, self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn article(title: &str, body: &str) -> GeneratedArticle {
        GeneratedArticle { title: title.into(), body: body.into(), links: vec![], bluesky_post: String::new() }
    }

    #[rstest]
    #[case(date(2025, 1, 6), date(2025, 1, 7))] // Mon
    #[case(date(2025, 1, 7), date(2025, 1, 8))] // Tue
    #[case(date(2025, 1, 9), date(2025, 1, 10))] // Thu
    #[case(date(2025, 1, 10), date(2025, 1, 13))] // Fri
    #[case(date(2025, 1, 11), date(2025, 1, 13))] // Sat
    #[case(date(2025, 1, 12), date(2025, 1, 13))] // Sun
    #[case(date(2024, 12, 31), date(2025, 1, 1))]
    fn test_next_business_day(#[case] today: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(next_business_day(today), expected);
    }

    #[test]
    fn test_date_stamp_is_zero_padded() {
        assert_eq!(date_stamp(date(2025, 3, 4)), "2025-03-04");
    }

    #[rstest]
    #[case("Nuevo hallazgo arqueológico en Aragón", "nuevo-hallazgo-arqueologico-aragon")]
    #[case("¡Éxito en la Universidad de Zaragoza!", "exito-universidad-zaragoza")]
    #[case("The Future of AI: What's Next?", "future-ai-whats-next")]
    #[case("Straße und Ærø", "strasse-und-aero")]
    #[case("COVID-19 vaccine_trial results 2025", "covid-19-vaccine-trial")]
    #[case("de la en el", "de-la-en-el")]
    #[case("  ---  ", "")]
    #[case("ＦＵＬＬ width", "full-width")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title, DEFAULT_SLUG_WORDS), expected);
    }

    #[rstest]
    #[case("Nuevo hallazgo arqueológico en Aragón")]
    #[case("  Ça   va? — «Sí», dijo   él…  ")]
    #[case("de la en el y los")]
    #[case("Łódź: 1.000 años de historia")]
    #[case("__init__ -- main")]
    fn test_slugify_properties(#[case] title: &str) {
        let slug = slugify(title, DEFAULT_SLUG_WORDS);
        assert_eq!(slug, slug.to_lowercase());
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'), "{slug}");
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(!slug.contains("--"));
        assert!(slug.split('-').count() <= DEFAULT_SLUG_WORDS);
        assert_eq!(slugify(&slug, DEFAULT_SLUG_WORDS), slug);
    }

    #[test]
    fn test_slugify_respects_word_cap() {
        assert_eq!(slugify("uno dos tres cuatro cinco", 2), "uno-dos");
        assert_eq!(slugify("uno dos", 0), "");
    }

    #[test]
    fn test_extract_person_names_honorific_first() {
        let text = "La Universidad de Zaragoza acoge la lectura. La Dra. María López presentará su trabajo.";
        let names = extract_person_names(text);
        assert_eq!(names.first().map(String::as_str), Some("María López"));
    }

    #[test]
    fn test_extract_person_names_after_connector() {
        let names = extract_person_names("Defensa de Tesis Doctoral de Jane Smith en la Facultad");
        assert_eq!(names.first().map(String::as_str), Some("Jane Smith"));
    }

    #[test]
    fn test_extract_person_names_skips_title_words() {
        let names = extract_person_names("PhD Thesis Defense Tomorrow");
        assert!(names.iter().all(|n| !n.contains("Thesis")), "{names:?}");
        assert!(extract_person_names("sin nombres aquí").is_empty());
    }

    #[test]
    fn test_detect_thesis_spanish() {
        let info = detect_thesis(
            "La Dr. Jane Smith defiende su tesis doctoral",
            "La tesis, titulada \"Aprendizaje automático para cultivos\", se leerá el lunes.",
            "",
        )
        .unwrap();

        assert_eq!(info.language, Language::Es);
        assert_eq!(info.first_name, "Jane");
        assert_eq!(info.surname, "Smith");
        assert_eq!(info.formatted_title(), "Lectura de Tesis de Jane Smith, \"Aprendizaje automático para cultivos\"");
        assert!(info.slug().starts_with("jane-smith-"));
        assert_eq!(info.slug(), "jane-smith-aprendizaje-automatico");
    }

    #[test]
    fn test_detect_thesis_english() {
        let info = detect_thesis(
            "Dr. Jane Smith to present PhD thesis “Soil Microbes and Drought”",
            "The defence takes place on Monday.",
            "",
        )
        .unwrap();

        assert_eq!(info.language, Language::En);
        assert_eq!(info.formatted_title(), "PhD Thesis Defense of Jane Smith, \"Soil Microbes and Drought\"");
        assert_eq!(info.slug(), "jane-smith-soil-microbes");
    }

    #[test]
    fn test_detect_thesis_from_source_text() {
        let source = "Lectura de tesis de Pedro Ruiz-Gómez: «Redes de sensores en el Pirineo». Aula 3.";
        let info = detect_thesis("Un investigador presenta su trabajo", "Cuerpo sin datos.", source).unwrap();
        assert_eq!(info.first_name, "Pedro");
        assert_eq!(info.surname, "Ruiz-Gómez");
        assert_eq!(info.thesis_title, "Redes de sensores en el Pirineo");
        assert_eq!(info.slug(), "pedro-ruiz-gomez-redes-sensores");
    }

    #[test]
    fn test_detect_thesis_without_quote_uses_topic() {
        let info =
            detect_thesis("Jane Smith defiende su tesis doctoral sobre redes neuronales", "Cuerpo sin comillas.", "")
                .unwrap();

        assert_eq!(info.thesis_title, "Redes neuronales");
        assert_eq!(info.formatted_title(), "Lectura de Tesis de Jane Smith, \"Redes neuronales\"");
        assert_eq!(info.slug(), "jane-smith-redes-neuronales");
        assert_eq!(info.slug().matches("jane").count(), 1);
    }

    #[test]
    fn test_detect_thesis_english_topic_stops_at_clause() {
        let info = detect_thesis("Dr. Jane Smith defends PhD thesis on soil microbes, Friday", "", "").unwrap();
        assert_eq!(info.thesis_title, "Soil microbes");
        assert_eq!(info.slug(), "jane-smith-soil-microbes");
    }

    #[test]
    fn test_detect_thesis_without_title_keeps_name_only() {
        let info = detect_thesis("Lectura de tesis de Ana Pérez", "Se celebra hoy.", "").unwrap();
        assert_eq!(info.thesis_title, "");
        assert_eq!(info.formatted_title(), "Lectura de Tesis de Ana Pérez");
        assert_eq!(info.slug(), "ana-perez");
    }

    #[test]
    fn test_no_thesis_without_keyword_or_author() {
        assert!(detect_thesis("Nuevo hallazgo arqueológico en Aragón", "El equipo de Ana Pérez...", "").is_none());
        assert!(detect_thesis("Próxima lectura de tesis", "sin autor conocido", "").is_none());
    }

    #[test]
    fn test_apply_rewrites_title() {
        let info = ThesisInfo {
            language: Language::Es,
            first_name: "Jane".into(),
            surname: "Smith".into(),
            thesis_title: "Título".into(),
        };
        let mut generated = article("Otro título", "Cuerpo");
        info.apply(&mut generated);
        assert_eq!(generated.title, "Lectura de Tesis de Jane Smith, \"Título\"");
    }

    #[test]
    fn test_naming_for_regular_article() {
        let tuesday = date(2025, 1, 7);
        let naming = ArticleNaming::derive(&article("Nuevo hallazgo arqueológico en Aragón", "..."), None, tuesday);

        assert_eq!(naming.date_stamp, "2025-01-08");
        assert_eq!(naming.slug, "nuevo-hallazgo-arqueologico-aragon");
        assert!(!naming.is_thesis);
        assert_eq!(naming.news_file_name(), "2025-01-08-nuevo-hallazgo-arqueologico-aragon.txt");
        assert_eq!(naming.bluesky_file_name(), "2025-01-08-nuevo-hallazgo-arqueologico-aragon_blsky.txt");
    }

    #[test]
    fn test_naming_for_thesis() {
        let info = ThesisInfo {
            language: Language::En,
            first_name: "Jane".into(),
            surname: "Smith".into(),
            thesis_title: "Soil Microbes".into(),
        };
        let naming = ArticleNaming::derive(&article("ignored", "..."), Some(&info), date(2025, 1, 10));
        assert_eq!(naming.news_file_name(), "2025-01-13-jane-smith-soil-microbes.txt");
        assert!(naming.is_thesis);
    }

    #[test]
    fn test_empty_slug_falls_back() {
        let naming = ArticleNaming::derive(&article("¿¡…!?", "..."), None, date(2025, 1, 7));
        assert_eq!(naming.slug, "article");
    }
}
