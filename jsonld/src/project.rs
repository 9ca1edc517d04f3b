use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::{
    node::{Gender, ImageObject, JsonLdNode, Person, Place, Thumbnail},
    options::ProjectionOptions,
    record::{
        Forbidden, IndividualRecord, MediaRecord, RecordDate, RecordPlace, RecordStore,
        TreeContext, VisibilityGate,
    },
};

/// The individual a document was requested for cannot be rendered.
///
/// The two cases are kept apart so that a caller can answer
/// differently (e.g. 404 vs. 403), but they are equally fatal.
#[derive(thiserror::Error, Debug, miette::Diagnostic, PartialEq, Eq)]
pub enum NotFoundOrForbidden {
    #[error("No individual {xref} in tree '{tree}'")]
    #[diagnostic(code(jsonld::not_found))]
    NotFound { xref: String, tree: String },

    #[error("Individual {xref} may not be shown")]
    #[diagnostic(
        code(jsonld::forbidden),
        help("the record is private, or restricted for the current viewer")
    )]
    Forbidden { xref: String },
}

impl From<Forbidden> for NotFoundOrForbidden {
    fn from(value: Forbidden) -> Self {
        NotFoundOrForbidden::Forbidden { xref: value.xref }
    }
}

/// Looks up `xref` in `tree` and projects it; see [`project_record`].
#[instrument(skip(store, gate, options, tree), fields(tree = %tree))]
pub fn project<S, G>(
    store: &S,
    gate: &G,
    options: &ProjectionOptions,
    tree: &TreeContext,
    xref: &str,
) -> Result<Person, NotFoundOrForbidden>
where
    S: RecordStore + ?Sized,
    G: VisibilityGate<S::Individual> + ?Sized,
{
    let Some(record) = store.resolve(tree, xref) else {
        return Err(NotFoundOrForbidden::NotFound {
            xref: xref.to_string(),
            tree: tree.name().to_string(),
        });
    };

    project_record(&record, gate, options)
}

/// Builds the [`Person`] for `record`, with their parents and children.
///
/// The root record must pass the gate. Relatives that do not pass it are
/// left out; relatives are described by their own fields only (there are
/// no grandparents or grandchildren in the result).
pub fn project_record<I, G>(
    record: &I,
    gate: &G,
    options: &ProjectionOptions,
) -> Result<Person, NotFoundOrForbidden>
where
    I: IndividualRecord,
    G: VisibilityGate<I> + ?Sized,
{
    gate.check_access(record)?;

    let projector = Projector { gate, options };
    let mut person = projector.fill(record);
    projector.add_parents(&mut person, record);
    projector.add_children(&mut person, record);
    Ok(person)
}

struct Projector<'a, G: ?Sized> {
    gate: &'a G,
    options: &'a ProjectionOptions,
}

impl<G: ?Sized> Projector<'_, G> {
    fn fill<I: IndividualRecord>(&self, record: &I) -> Person {
        debug!(xref = record.xref(), "creating person");

        let mut person = Person::new();
        if let Some(uri) = record.uri() {
            person.set_id(uri);
        }

        if let Some(name) = record.primary_name() {
            person.name = Some(name.full);
            person.given_name = name.given;
            person.family_name = name.surname;
        }

        person.gender = Some(
            record
                .sex()
                .map(|code| Gender::from_code(&code))
                .unwrap_or_default(),
        );

        person.birth_date = record.birth_date().as_ref().and_then(date_value);
        person.death_date = record.death_date().as_ref().and_then(date_value);
        person.birth_place = record.birth_place().and_then(place);
        person.death_place = record.death_place().and_then(place);
        person.image = record
            .highlighted_media()
            .map(|media| self.image(media));

        person
    }

    fn relative<I>(&self, record: &I, role: &'static str) -> Option<Person>
    where
        I: IndividualRecord,
        G: VisibilityGate<I>,
    {
        if self.gate.can_show(record) {
            Some(self.fill(record))
        } else {
            debug!(xref = record.xref(), role, "relative is hidden");
            None
        }
    }

    fn add_parents<I>(&self, person: &mut Person, record: &I)
    where
        I: IndividualRecord,
        G: VisibilityGate<I>,
    {
        let Some(family) = record.primary_child_family() else {
            // no family, no parents
            return;
        };

        for parent in [family.husband, family.wife].iter().flatten() {
            if let Some(parent) = self.relative(parent, "parent") {
                person.add_parent(parent);
            }
        }
    }

    fn add_children<I>(&self, person: &mut Person, record: &I)
    where
        I: IndividualRecord,
        G: VisibilityGate<I>,
    {
        let mut seen = HashSet::new();
        for family in record.spouse_families() {
            for child in family.children {
                // the same child can be listed in more than one family
                if !seen.insert(child.xref().to_string()) {
                    continue;
                }

                if let Some(child) = self.relative(&child, "child") {
                    person.add_child(child);
                }
            }
        }
    }

    fn image(&self, media: MediaRecord) -> ImageObject {
        let base_url = &self.options.base_url;

        let mut image = ImageObject::new();
        if let Some(uri) = &media.uri {
            image.set_id(uri.as_str());
        }

        image.content_url = Some(base_url.absolute(&media.file.path));
        image.name = media.title;
        image.description = media.caption.as_deref().map(strip_tags);
        image.width = media.file.width;
        image.height = media.file.height;

        if let Some(file) = media.thumbnail {
            let url = base_url.absolute(&file.path);
            image.thumbnail_url = Some(url.clone());

            let mut thumbnail = Thumbnail::new();
            if let Some(uri) = media.uri {
                thumbnail.set_id(uri);
            }

            thumbnail.content_url = Some(url);
            thumbnail.width = file.width;
            thumbnail.height = file.height;
            image.thumbnail = Some(thumbnail);
        }

        image
    }
}

/// Exact dates are used as they are; dates that lie between two years
/// become `min/max`; anything else is left out rather than guessed at.
fn date_value(date: &RecordDate) -> Option<String> {
    let rendered = strip_tags(&date.display);
    if is_iso_date(&rendered) {
        return Some(rendered);
    }

    let range = date.between?;
    let four_digits = 0..=9999;
    if four_digits.contains(&range.min) && four_digits.contains(&range.max) {
        Some(format!("{:04}/{:04}", range.min, range.max))
    } else {
        None
    }
}

/// A place is only described when it has a name and a page of its own.
fn place(record: RecordPlace) -> Option<Place> {
    let name = strip_tags(&record.display);
    let uri = record.uri.filter(|uri| !uri.is_empty())?;
    if name.is_empty() {
        return None;
    }

    let mut place = Place::new();
    place.set_id(uri);
    place.name = Some(name);
    Some(place)
}

/// Matches `YYYY-MM-DD` exactly.
fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(ix, b)| match ix {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Removes anything that looks like an HTML/XML tag and trims the result.
fn strip_tags(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => result.push(c),
            _ => {}
        }
    }

    result.trim().to_string()
}
