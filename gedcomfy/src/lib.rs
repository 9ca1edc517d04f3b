//! This is a library for reading GEDCOM files into a record store
//! that can be projected as JSON-LD by the [`jsonld`] crate.
//!
//! Parsing happens in two stages: [`lines::iterate_lines`] splits the
//! input into lines, and [`records`] assembles those into a tree of
//! records. The records that matter for projection (individuals, families,
//! and media objects) are then indexed into a [`GedcomTree`].

use miette::SourceSpan;
use vec1::Vec1;

mod date;
pub mod lines;
mod names;
mod options;
mod privacy;
pub mod records;
mod store;

pub use date::{GedcomDate, Qualifier, SimpleDate};
pub use options::StoreOptions;
pub use privacy::PrivacyPolicy;
pub use store::{GedcomStore, GedcomTree, IndividualRef};

use lines::LineSyntaxError;
use records::RecordStructureError;

/// A value that is sourced from a specific location in a GEDCOM file.
///
/// This is used in many places to ensure that we can track back values
/// to their original location, which means that we can provide good
/// diagnostics in the case of errors.
///
/// [`SourceSpan`] values are used to represent the location of
/// the value in the input and can be rendered by [`miette`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Sourced<T> {
    pub value: T,
    pub span: SourceSpan,
}

/// A [`Sourced`] value derefs to the inner value, making
/// it easier to work with when the source information is not needed.
impl<T> std::ops::Deref for Sourced<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum LoadError {
    #[error("{} syntax error{} detected", .errors.len(), if .errors.len() > 1 { "s" } else { "" })]
    #[diagnostic(code(gedcom::syntax_errors))]
    SyntaxErrorsDetected {
        #[related]
        errors: Vec1<LineSyntaxError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] RecordStructureError),

    #[error("File is not valid UTF-8")]
    #[diagnostic(
        code(gedcom::encoding_error),
        help("only UTF-8 encoded GEDCOM files are supported")
    )]
    NotUtf8 {
        #[source]
        source: std::str::Utf8Error,
        #[label("this is the first invalid byte")]
        span: SourceSpan,
    },
}
