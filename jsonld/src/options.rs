use std::str::FromStr;

use url::Url;

/// The absolute URL a site is deployed at.
///
/// Media paths are relative to this URL. It is always an `http` or `https`
/// URL, has no query or fragment, and its path always ends in `/`, so that
/// appending a relative path to it yields a URL under the same site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum BaseUrlError {
    #[error("Invalid base URL")]
    #[diagnostic(code(jsonld::base_url::invalid))]
    Invalid(#[from] url::ParseError),

    #[error("Unsupported scheme '{scheme}' in base URL")]
    #[diagnostic(
        code(jsonld::base_url::unsupported_scheme),
        help("the base URL must start with http:// or https://")
    )]
    UnsupportedScheme { scheme: String },
}

impl BaseUrl {
    pub fn parse(input: &str) -> Result<Self, BaseUrlError> {
        let mut url = Url::parse(input.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BaseUrlError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self(url))
    }

    /// Appends a site-relative path (with or without a leading `/`).
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.0.as_str(), path.trim_start_matches('/'))
    }

    /// Builds the URL of a resource below the base, one path segment per
    /// item. Segments are percent-encoded, so they may contain `/` or spaces.
    pub fn resource<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url.as_str().to_string()
    }

    /// Like [`resource`](Self::resource), but gives the encoded path
    /// relative to the base, suitable for [`absolute`](Self::absolute).
    pub fn relative<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> String {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let base = self.0.path();
        url.path()
            .strip_prefix(base)
            .unwrap_or_else(|| url.path().trim_start_matches('/'))
            .to_string()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for BaseUrl {
    type Err = BaseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`project`](crate::project).
///
/// These are passed explicitly on every call; projection never
/// looks at any ambient (per-request or global) state.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProjectionOptions {
    pub base_url: BaseUrl,
}

impl ProjectionOptions {
    pub fn new(base_url: BaseUrl) -> Self {
        Self { base_url }
    }

    pub fn base_url(self, base_url: BaseUrl) -> Self {
        Self { base_url, ..self }
    }
}
