//! This is a library for describing genealogical individuals as
//! [schema.org](https://schema.org/Person) JSON-LD documents.
//!
//! The work is split in two:
//!
//! - [`project`] walks an individual from a [`RecordStore`], along with
//!   their parents and children, and builds a [`Person`] node tree.
//!   Every record is checked against a [`VisibilityGate`] before any of
//!   its data is read.
//! - [`serialize`] turns any node into a [`CanonicalDocument`], dropping
//!   every field that has no value, so that only populated data is emitted.
//!
//! [`render`] composes the two and produces the JSON text. The [`html`] and
//! [`negotiate`] modules contain the small amount of glue needed to embed
//! the document in a page or to serve it directly.

pub mod html;
pub mod negotiate;
mod node;
mod options;
mod project;
mod prune;
mod record;

pub use node::{Envelope, Gender, ImageObject, JsonLdNode, NodeType, Person, Place, Thumbnail};
pub use options::{BaseUrl, BaseUrlError, ProjectionOptions};
pub use project::{project, project_record, NotFoundOrForbidden};
pub use prune::{prune, serialize, CanonicalDocument, UnsupportedValueKind, SCHEMA_ORG_CONTEXT};
pub use record::{
    Family, Forbidden, IndividualRecord, MediaFile, MediaRecord, PersonName, RecordDate,
    RecordPlace, RecordStore, ShowAll, TreeContext, VisibilityGate, YearRange,
};

/// The hard failures of [`render`].
///
/// Anything else that goes wrong while rendering (a missing date,
/// a relative that may not be shown, and so on) only results in
/// the corresponding field being left out of the document.
#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum RenderError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    NotFoundOrForbidden(#[from] NotFoundOrForbidden),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnsupportedValueKind(#[from] UnsupportedValueKind),
}

/// Renders the individual `xref` of `tree` as pretty-printed JSON-LD.
///
/// Forward slashes are not escaped, so URLs appear verbatim.
#[tracing::instrument(skip(store, gate, options, tree), fields(tree = %tree))]
pub fn render<S, G>(
    store: &S,
    gate: &G,
    options: &ProjectionOptions,
    tree: &TreeContext,
    xref: &str,
) -> Result<String, RenderError>
where
    S: RecordStore + ?Sized,
    G: VisibilityGate<S::Individual> + ?Sized,
{
    let person = project(store, gate, options, tree, xref)?;
    let document = serialize(&person)?;
    Ok(format!("{document:#}"))
}
