//! The interface to the application that holds the genealogical records.
//!
//! Nothing in this crate stores records itself: a [`RecordStore`] hands out
//! [`IndividualRecord`] handles, and a [`VisibilityGate`] decides which of
//! them may be disclosed.

/// Identifies which tree (data set) an identifier belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeContext {
    name: String,
}

impl TreeContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for TreeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

pub trait RecordStore {
    type Individual: IndividualRecord;

    /// Looks up an individual by identifier, returning `None` if there is no such record.
    fn resolve(&self, tree: &TreeContext, xref: &str) -> Option<Self::Individual>;
}

/// A name as segmented by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    /// The full form of the name, for display.
    pub full: String,
    pub given: Option<String>,
    pub surname: Option<String>,
}

/// An inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// A date as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDate {
    /// The date rendered in `%Y-%m-%d` format, as far as the store is able
    /// to. Dates that are partial or qualified render differently; the text
    /// may also contain markup.
    pub display: String,
    /// Year bounds, if the date is known to lie between two dates.
    pub between: Option<YearRange>,
}

impl RecordDate {
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            between: None,
        }
    }

    pub fn between(display: impl Into<String>, min: i32, max: i32) -> Self {
        Self {
            display: display.into(),
            between: Some(YearRange { min, max }),
        }
    }
}

/// A place as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlace {
    pub display: String,
    /// The address of the place's own page, if it has one.
    pub uri: Option<String>,
}

/// One rendition of a media object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Percent-encoded path of the file relative to the site's base URL.
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A media object attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub uri: Option<String>,
    pub title: Option<String>,
    /// The full caption; may contain markup.
    pub caption: Option<String>,
    pub file: MediaFile,
    pub thumbnail: Option<MediaFile>,
}

/// A family, with its members already resolved.
#[derive(Debug, Clone)]
pub struct Family<I> {
    pub husband: Option<I>,
    pub wife: Option<I>,
    pub children: Vec<I>,
}

/// Read access to an individual.
///
/// All accessors return `None` (or nothing) when the store does not have
/// the data; none of them fail.
pub trait IndividualRecord: Sized {
    /// The record's identifier, unique within its tree.
    fn xref(&self) -> &str;

    /// The canonical URI of the record's page.
    fn uri(&self) -> Option<String>;

    fn primary_name(&self) -> Option<PersonName>;

    fn sex(&self) -> Option<String>;

    fn birth_date(&self) -> Option<RecordDate>;

    fn death_date(&self) -> Option<RecordDate>;

    fn birth_place(&self) -> Option<RecordPlace>;

    fn death_place(&self) -> Option<RecordPlace>;

    /// The media object chosen to represent the individual, if any.
    fn highlighted_media(&self) -> Option<MediaRecord>;

    /// The family the individual was born into.
    fn primary_child_family(&self) -> Option<Family<Self>>;

    /// The families in which the individual is a spouse, in record order.
    fn spouse_families(&self) -> Vec<Family<Self>>;
}

/// Decides whether a record may be disclosed to the current viewer.
pub trait VisibilityGate<R: IndividualRecord> {
    fn can_show(&self, record: &R) -> bool;

    fn check_access(&self, record: &R) -> Result<(), Forbidden> {
        if self.can_show(record) {
            Ok(())
        } else {
            Err(Forbidden {
                xref: record.xref().to_string(),
            })
        }
    }
}

#[derive(thiserror::Error, Debug, miette::Diagnostic, PartialEq, Eq)]
#[error("Individual {xref} may not be shown")]
#[diagnostic(code(jsonld::forbidden))]
pub struct Forbidden {
    pub xref: String,
}

/// A gate that shows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowAll;

impl<R: IndividualRecord> VisibilityGate<R> for ShowAll {
    fn can_show(&self, _record: &R) -> bool {
        true
    }
}

impl<R: IndividualRecord, G: VisibilityGate<R> + ?Sized> VisibilityGate<R> for &G {
    fn can_show(&self, record: &R) -> bool {
        (**self).can_show(record)
    }

    fn check_access(&self, record: &R) -> Result<(), Forbidden> {
        (**self).check_access(record)
    }
}
