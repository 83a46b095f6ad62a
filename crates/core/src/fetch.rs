//! Source loading from local files and web pages.
//!
//! This module provides the two ways a generation run obtains its raw input:
//! reading a local text file and fetching an HTTP/HTTPS page. Page bodies are
//! returned as raw HTML; turning them into text is the job of
//! [`crate::extract`].

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::{NewsdeskError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds. `None` keeps the client default.
    pub timeout: Option<u64>,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: None, user_agent: "Mozilla/5.0 (compatible; Newsdesk/0.3)".to_string() }
    }
}

/// Something that can turn a URL into a response body.
///
/// The pipeline only talks to this trait so tests can count requests.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| NewsdeskError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

impl Fetcher for HttpFetcher {
    /// Performs a single GET request; no retries.
    ///
    /// Non-success statuses are errors, redirects are followed.
    fn fetch(&self, url: &str) -> Result<String> {
        let parsed_url = validate_url(url)?;

        let response = self
            .client
            .get(parsed_url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "es-ES,es;q=0.9,en;q=0.8")
            .send()
            .map_err(|e| transport_error(url, &self.config, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsdeskError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.text().map_err(|e| transport_error(url, &self.config, e))?;
        tracing::debug!(url, bytes = body.len(), "fetched page");

        Ok(body)
    }
}

fn transport_error(url: &str, config: &FetchConfig, e: reqwest::Error) -> NewsdeskError {
    match config.timeout {
        Some(timeout) if e.is_timeout() => NewsdeskError::Timeout { url: url.to_string(), timeout },
        _ => NewsdeskError::Fetch { url: url.to_string(), reason: e.to_string() },
    }
}

/// Checks that a URL is absolute, uses http/https and names a host.
pub fn validate_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(NewsdeskError::InvalidUrl("URL is empty".to_string()));
    }

    let parsed = Url::parse(trimmed).map_err(|e| NewsdeskError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NewsdeskError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            trimmed
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(NewsdeskError::InvalidUrl(format!("{}: missing host", trimmed)));
    }

    Ok(parsed)
}

/// Reads a local source file and returns its trimmed text.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn read_source_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(NewsdeskError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(NewsdeskError::NotAFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => NewsdeskError::PermissionDenied(path.to_path_buf()),
        ErrorKind::InvalidData => NewsdeskError::InvalidEncoding(path.to_path_buf()),
        ErrorKind::NotFound => NewsdeskError::FileNotFound(path.to_path_buf()),
        _ => NewsdeskError::Io(e),
    })?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(NewsdeskError::EmptyFile(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), chars = trimmed.chars().count(), "read source file");
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert!(config.timeout.is_none());
        assert!(config.user_agent.contains("Newsdesk"));
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/news/1").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_bad_input() {
        assert!(matches!(validate_url(""), Err(NewsdeskError::InvalidUrl(_))));
        assert!(matches!(validate_url("example.com"), Err(NewsdeskError::InvalidUrl(_))));
        assert!(matches!(validate_url("ftp://example.com/file"), Err(NewsdeskError::InvalidUrl(_))));
        assert!(matches!(validate_url("file:///etc/passwd"), Err(NewsdeskError::InvalidUrl(_))));
    }

    #[test]
    fn test_http_fetcher_rejects_invalid_url_without_network() {
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch("not-a-url");
        assert!(matches!(result, Err(NewsdeskError::InvalidUrl(_))));
    }

    #[test]
    fn test_read_source_file_not_found() {
        let result = read_source_file(Path::new("/nonexistent/path/noticia.txt"));
        assert!(matches!(result, Err(NewsdeskError::FileNotFound(_))));
    }

    #[test]
    fn test_read_source_file_directory() {
        let dir = TempDir::new().unwrap();
        let result = read_source_file(dir.path());
        assert!(matches!(result, Err(NewsdeskError::NotAFile(_))));
    }

    #[test]
    fn test_read_source_file_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "   \n\t  ").unwrap();
        let result = read_source_file(file.path());
        assert!(matches!(result, Err(NewsdeskError::EmptyFile(_))));
    }

    #[test]
    fn test_read_source_file_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x80, 0xff, 0x6f]).unwrap();
        let result = read_source_file(file.path());
        assert!(matches!(result, Err(NewsdeskError::InvalidEncoding(_))));
    }

    #[test]
    fn test_read_source_file_trims() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\n  Contenido de prueba del archivo.  \n").unwrap();
        let text = read_source_file(file.path()).unwrap();
        assert_eq!(text, "Contenido de prueba del archivo.");
    }
}
