//! Rendering and writing of the output files.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::config::Language;
use crate::naming::ArticleNaming;
use crate::response::GeneratedArticle;

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub news: PathBuf,
    /// `None` when the article has no social post.
    pub bluesky: Option<PathBuf>,
}

/// The labelled news block:
///
/// ```text
/// Título: <title>
///
/// Texto: <body>
///
/// Enlaces:
/// - <link>
/// ```
///
/// The links block is left out when there are no links.
pub fn render_article(article: &GeneratedArticle, language: Language) -> String {
    let labels = language.labels();
    let mut out = format!("{}: {}\n\n{}: {}\n", labels.title, article.title, labels.text, article.body);

    if !article.links.is_empty() {
        out.push('\n');
        out.push_str(labels.links);
        out.push_str(":\n");
        for link in &article.links {
            out.push_str("- ");
            out.push_str(link);
            out.push('\n');
        }
    }

    out
}

/// Writes the news file and, if the post is not empty, the `_blsky.txt`
/// file into `dir`, creating it if needed. Existing files are overwritten.
///
/// Either every file is written or none is: both are staged first and then
/// renamed into place.
pub fn write_outputs(
    dir: &Path, article: &GeneratedArticle, naming: &ArticleNaming, language: Language,
) -> Result<OutputFiles> {
    fs::create_dir_all(dir)?;

    let news = dir.join(naming.news_file_name());
    let post = article.bluesky_post.trim();
    let bluesky = (!post.is_empty()).then(|| dir.join(naming.bluesky_file_name()));

    let mut files = vec![(news.clone(), render_article(article, language))];
    if let Some(path) = &bluesky {
        files.push((path.clone(), format!("{}\n", post)));
    }
    commit(&files)?;

    tracing::info!(path = %news.display(), "wrote news file");
    if let Some(path) = &bluesky {
        tracing::info!(path = %path.display(), "wrote bluesky post");
    }

    Ok(OutputFiles { news, bluesky })
}

/// `.name.tmp` next to `path`.
fn staged_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard<'p>(paths: impl IntoIterator<Item = &'p PathBuf>) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

/// Stages every file next to its target, then renames them into place.
/// On failure the staged files and the ones already renamed are removed.
fn commit(files: &[(PathBuf, String)]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in files {
        let tmp = staged_path(path);
        if let Err(e) = fs::write(&tmp, contents) {
            discard(&staged);
            discard([&tmp]);
            return Err(e.into());
        }
        staged.push(tmp);
    }

    for (done, ((path, _), tmp)) in files.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            tracing::warn!(path = %path.display(), error = %e, "rolling back output files");
            discard(&staged[done..]);
            discard(files[..done].iter().map(|(p, _)| p));
            return Err(e.into());
        }
    }

    Ok(())
}
