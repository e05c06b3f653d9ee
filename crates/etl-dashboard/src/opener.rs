//! Where a resolved download URL goes: a browser, or stdout on headless hosts.

use std::io::Write;

#[derive(Debug, thiserror::Error)]
#[error("could not open {url}: {reason}")]
pub struct OpenError {
    pub url: String,
    pub reason: String,
}

/// Opens a URL in a new browsing context.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

/// System browser via the platform opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        open::that_detached(url).map_err(|e| OpenError {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Prints the URL on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{url}").map_err(|e| OpenError {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
