use jsonld::BaseUrl;

/// Settings for loading a [`GedcomTree`](crate::GedcomTree).
///
/// The base URL is used to build the URIs of individuals, places and
/// media objects, so it should be the same one that documents are
/// projected with.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct StoreOptions {
    pub base_url: BaseUrl,
}

impl StoreOptions {
    pub fn new(base_url: BaseUrl) -> Self {
        Self { base_url }
    }

    pub fn base_url(self, base_url: BaseUrl) -> Self {
        Self { base_url, ..self }
    }
}
