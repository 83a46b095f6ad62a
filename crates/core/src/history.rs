//! Lookup of previously written social posts (`*_blsky.txt`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;
use url::Url;

use crate::{NewsdeskError, Result};

const POST_SUFFIX: &str = "_blsky.txt";

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").unwrap());

/// A post file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl PostFile {
    /// File name without the date prefix and the `_blsky.txt` suffix.
    pub fn topic(&self) -> String {
        let name = self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let stem = name.strip_suffix(POST_SUFFIX).unwrap_or(&name);
        DATE_PREFIX.replace(stem, "").into_owned()
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?.trim().to_string())
    }
}

/// All post files in `dir`, newest first.
fn list_posts(dir: &Path) -> Result<Vec<PostFile>> {
    if !dir.exists() {
        return Err(NewsdeskError::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(NewsdeskError::Config(format!("{} is not a directory", dir.display())));
    }

    let mut posts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_post = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(POST_SUFFIX));
        if !is_post || !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        posts.push(PostFile { path, modified });
    }

    posts.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(posts)
}

/// The `count` most recently modified posts.
pub fn recent_posts(dir: &Path, count: usize) -> Result<Vec<PostFile>> {
    let mut posts = list_posts(dir)?;
    posts.truncate(count);
    Ok(posts)
}

/// The part of a URL used to recognise its posts: the last path segment,
/// or the one before it when the last is three characters or fewer.
pub fn url_key(url: &str) -> Option<String> {
    let segments: Vec<String> = match Url::parse(url.trim()) {
        Ok(parsed) => parsed
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
        Err(_) => url.trim().split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
    };

    let last = segments.last()?;
    let key = if last.chars().count() <= 3 && segments.len() > 1 { &segments[segments.len() - 2] } else { last };

    let key = key.trim_end_matches(".html").trim_end_matches(".htm").to_lowercase();
    if key.is_empty() { None } else { Some(key) }
}

/// Posts whose topic contains the URL key, newest first.
pub fn posts_for_url(dir: &Path, url: &str) -> Result<Vec<PostFile>> {
    let posts = list_posts(dir)?;
    let Some(key) = url_key(url) else {
        return Ok(Vec::new());
    };

    Ok(posts.into_iter().filter(|p| p.topic().to_lowercase().contains(&key)).collect())
}
