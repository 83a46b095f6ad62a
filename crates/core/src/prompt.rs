//! Prompt construction for the language model.
//!
//! A [`Prompt`] is a fixed system instruction in the working language plus a
//! user message carrying the optional extra instructions and the source text.

use crate::config::Language;
use crate::{NewsdeskError, Result};

/// Longest accepted custom instruction, in characters.
pub const MAX_INSTRUCTION_CHARS: usize = 1000;

/// Section labels for one language, as written to the news file and asked
/// of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub title: &'static str,
    pub text: &'static str,
    pub links: &'static str,
    pub bluesky: &'static str,
}

const ES_LABELS: Labels = Labels { title: "Título", text: "Texto", links: "Enlaces", bluesky: "Bluesky" };
const EN_LABELS: Labels = Labels { title: "Title", text: "Text", links: "Links", bluesky: "Bluesky" };

const ES_SYSTEM: &str = "\
Eres un asistente de redacción de noticias. Con el texto de entrada redacta una noticia y un post breve para redes sociales.

Estilo:
- Usa la voz activa siempre que puedas.
- Mantén un tono neutro e informativo.

Secciones:
1. Título: el asunto principal y los nombres de las personas protagonistas. Conciso, sin acrónimos ni códigos internos.
2. Texto: un primer párrafo con lo fundamental (quién, qué, proyecto o actividad) y después uno o más párrafos con los detalles de las personas y organizaciones implicadas. Si el original incluye resumen, abstract o biografía, añádelos al final.
3. Enlaces: las URL relevantes que aparezcan en el texto, una por línea.
4. Bluesky: un post de 300 caracteres como máximo, tono neutro, con los protagonistas, hashtags relevantes y terminado con el marcador [enlace a la noticia].

Responde EXACTAMENTE con este formato, sin nada antes ni después:
Título: [título]
Texto: [texto]
Enlaces:
- [enlace 1]
- [enlace 2]
Bluesky: [post]";

const EN_SYSTEM: &str = "\
You are a news writing assistant. From the input text, write a news article and a short social media post.

Style:
- Prefer the active voice.
- Keep a neutral, informative tone.

Sections:
1. Title: the main subject and the names of the people involved. Concise, no acronyms or internal codes.
2. Text: an opening paragraph with the essentials (who, what, project or activity), then one or more paragraphs about the people and organisations involved. If the source has a summary, abstract or biography, add it at the end.
3. Links: the relevant URLs found in the text, one per line.
4. Bluesky: a post of at most 300 characters, neutral tone, naming the people involved, with relevant hashtags and ending with the placeholder [link to the news].

Answer EXACTLY in this format, with nothing before or after:
Title: [title]
Text: [text]
Links:
- [link 1]
- [link 2]
Bluesky: [post]";

impl Language {
    pub fn labels(self) -> Labels {
        match self {
            Self::Es => ES_LABELS,
            Self::En => EN_LABELS,
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Es => ES_SYSTEM,
            Self::En => EN_SYSTEM,
        }
    }

    /// Placeholder the model is told to end the social post with.
    pub fn link_placeholder(self) -> &'static str {
        match self {
            Self::Es => "[enlace a la noticia]",
            Self::En => "[link to the news]",
        }
    }

    fn extra_heading(self) -> &'static str {
        match self {
            Self::Es => "Instrucciones adicionales",
            Self::En => "Additional instructions",
        }
    }

    fn url_heading(self) -> &'static str {
        match self {
            Self::Es => "URL de origen",
            Self::En => "Source URL",
        }
    }

    fn input_delimiter(self) -> &'static str {
        match self {
            Self::Es => "--- Texto de entrada ---",
            Self::En => "--- Input text ---",
        }
    }
}

/// The two text blocks sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Total characters across both blocks.
    pub fn len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Builds the prompt for one generation run.
pub fn build_prompt(source_text: &str, instructions: Option<&str>, source_url: Option<&str>, language: Language) -> Prompt {
    let mut user = String::new();

    if let Some(extra) = instructions {
        user.push_str(&format!("{}: {}\n\n", language.extra_heading(), extra));
    }
    if let Some(url) = source_url {
        user.push_str(&format!("{}: {}\n\n", language.url_heading(), url));
    }

    user.push_str(language.input_delimiter());
    user.push('\n');
    user.push_str(source_text);

    Prompt { system: language.system_prompt().to_string(), user }
}

/// Trims custom instructions; blank becomes `None`.
///
/// # Errors
///
/// Returns [`NewsdeskError::InvalidInstructions`] above [`MAX_INSTRUCTION_CHARS`].
pub fn validate_instructions(raw: Option<&str>) -> Result<Option<String>> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let count = trimmed.chars().count();
    if count > MAX_INSTRUCTION_CHARS {
        return Err(NewsdeskError::InvalidInstructions(format!(
            "{} characters given, at most {} allowed",
            count, MAX_INSTRUCTION_CHARS
        )));
    }

    Ok(Some(trimmed.to_string()))
}
