use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};

use jsonld::{
    BaseUrl, Family, IndividualRecord, MediaFile, MediaRecord, PersonName, RecordDate,
    RecordPlace, RecordStore, TreeContext,
};
use miette::{IntoDiagnostic, NamedSource, SourceSpan, WrapErr};
use tracing::{debug, instrument, warn};
use vec1::Vec1;

use crate::{
    date::GedcomDate,
    lines::iterate_lines,
    names::person_name,
    options::StoreOptions,
    records::{RawRecord, RecordBuilder},
    LoadError, Sourced,
};

#[derive(Debug, Default)]
struct Event {
    date: Option<RecordDate>,
    place: Option<String>,
}

#[derive(Debug)]
pub(crate) struct IndividualData {
    xref: String,
    name: Option<PersonName>,
    sex: Option<String>,
    birth: Event,
    death: Event,
    media: Option<MediaRecord>,
    child_families: Vec<usize>,
    spouse_families: Vec<usize>,
    pub(crate) restricted: bool,
    pub(crate) deceased: bool,
}

#[derive(Debug)]
struct FamilyData {
    husband: Option<usize>,
    wife: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug, Clone)]
struct MediaObject {
    uri: Option<String>,
    title: Option<String>,
    caption: Option<String>,
    file: Option<MediaFile>,
    thumbnail: Option<MediaFile>,
    primary: bool,
}

impl MediaObject {
    fn into_record(self) -> Option<MediaRecord> {
        Some(MediaRecord {
            uri: self.uri,
            title: self.title,
            caption: self.caption,
            file: self.file?,
            thumbnail: self.thumbnail,
        })
    }
}

/// A loaded GEDCOM file.
///
/// The tree is immutable once loaded; all cross-references between
/// records have been resolved, and dangling ones dropped.
#[derive(Debug)]
pub struct GedcomTree {
    context: TreeContext,
    base_url: BaseUrl,
    individuals: Vec<IndividualData>,
    families: Vec<FamilyData>,
    index: HashMap<String, usize>,
}

/// Records as read from the file, before pointers are resolved.
struct Pending<'i> {
    individuals: Vec<&'i RawRecord<'i>>,
    families: Vec<&'i RawRecord<'i>>,
    media: HashMap<&'i str, &'i RawRecord<'i>>,
}

impl GedcomTree {
    pub fn context(&self) -> &TreeContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Reads the file at `path`; the tree is named after the file stem.
    ///
    /// Errors carry the file's contents, so they can be rendered with
    /// their source spans.
    pub fn read_file(
        path: &Path,
        name: Option<&str>,
        options: &StoreOptions,
    ) -> miette::Result<GedcomTree> {
        let data = std::fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read file: {}", path.display()))?;

        let tree_name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tree".to_string()),
        };

        GedcomTree::from_bytes(&path.to_string_lossy(), &tree_name, &data, options)
    }

    /// Loads a tree from raw file contents; `origin` names the source
    /// in diagnostics.
    fn from_bytes(
        origin: &str,
        name: &str,
        data: &[u8],
        options: &StoreOptions,
    ) -> miette::Result<GedcomTree> {
        // spans are relative to the text after any byte order mark
        let body = strip_bom(data);
        decode(body)
            .and_then(|source| GedcomTree::parse(name, source, options))
            .map_err(|e| {
                miette::Report::new(e).with_source_code(NamedSource::new(origin, body.to_vec()))
            })
    }

    /// Parses a GEDCOM document held in memory.
    #[instrument(skip(source, options))]
    pub fn parse(name: &str, source: &str, options: &StoreOptions) -> Result<Self, LoadError> {
        let records = build_records(source)?;
        debug!(records = records.len(), "read records");

        let mut pending = Pending {
            individuals: Vec::new(),
            families: Vec::new(),
            media: HashMap::new(),
        };

        for record in &records {
            match (record.tag(), record.xref()) {
                ("INDI", Some(_)) => pending.individuals.push(record),
                ("FAM", Some(_)) => pending.families.push(record),
                ("OBJE", Some(xref)) => {
                    pending.media.insert(xref, record);
                }
                ("INDI" | "FAM" | "OBJE", None) => {
                    warn!(tag = record.tag(), "ignoring record without an xref");
                }
                _ => {}
            }
        }

        let context = TreeContext::new(name);
        let builder = TreeBuilder {
            context: &context,
            base_url: &options.base_url,
            pending: &pending,
        };

        let tree = builder.build();
        debug!(
            individuals = tree.individuals.len(),
            families = tree.families.len(),
            "loaded tree"
        );

        Ok(tree)
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data)
}

fn decode(data: &[u8]) -> Result<&str, LoadError> {
    std::str::from_utf8(data).map_err(|source| {
        let offset = source.valid_up_to();
        LoadError::NotUtf8 {
            source,
            span: SourceSpan::from((offset, 1)),
        }
    })
}

fn build_records(source: &str) -> Result<Vec<Sourced<RawRecord<'_>>>, LoadError> {
    let mut errors = Vec::new();
    let mut records = Vec::new();
    let mut builder = RecordBuilder::new();
    for line in iterate_lines(source) {
        match line {
            Ok(line) if errors.is_empty() => records.extend(builder.handle_line(line)?),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    if let Ok(errors) = Vec1::try_from(errors) {
        return Err(LoadError::SyntaxErrorsDetected { errors });
    }

    records.extend(builder.complete());
    Ok(records)
}

struct TreeBuilder<'a, 'i> {
    context: &'a TreeContext,
    base_url: &'a BaseUrl,
    pending: &'a Pending<'i>,
}

impl TreeBuilder<'_, '_> {
    fn build(&self) -> GedcomTree {
        let index: HashMap<String, usize> = self
            .pending
            .individuals
            .iter()
            .enumerate()
            .filter_map(|(ix, record)| Some((record.xref()?.to_string(), ix)))
            .collect();

        let family_index: HashMap<&str, usize> = self
            .pending
            .families
            .iter()
            .enumerate()
            .filter_map(|(ix, record)| Some((record.xref()?, ix)))
            .collect();

        let resolve_individual = |record: &RawRecord<'_>| {
            let xref = record.pointer()?;
            let ix = index.get(xref).copied();
            if ix.is_none() {
                warn!(xref, tag = record.tag(), "dangling pointer to individual");
            }
            ix
        };

        let resolve_family = |record: &RawRecord<'_>| {
            let xref = record.pointer()?;
            let ix = family_index.get(xref).copied();
            if ix.is_none() {
                warn!(xref, tag = record.tag(), "dangling pointer to family");
            }
            ix
        };

        let families = self
            .pending
            .families
            .iter()
            .map(|record| FamilyData {
                husband: record.subrecord("HUSB").and_then(resolve_individual),
                wife: record.subrecord("WIFE").and_then(resolve_individual),
                children: record
                    .subrecords("CHIL")
                    .filter_map(resolve_individual)
                    .collect(),
            })
            .collect();

        let individuals = self
            .pending
            .individuals
            .iter()
            .map(|record| {
                let mut data = self.individual(record);
                data.child_families = record.subrecords("FAMC").filter_map(resolve_family).collect();
                data.spouse_families = record.subrecords("FAMS").filter_map(resolve_family).collect();
                data
            })
            .collect();

        GedcomTree {
            context: self.context.clone(),
            base_url: self.base_url.clone(),
            individuals,
            families,
            index,
        }
    }

    fn individual(&self, record: &RawRecord<'_>) -> IndividualData {
        let restriction = record
            .subrecord_text("RESN")
            .unwrap_or_default()
            .to_ascii_lowercase();

        IndividualData {
            xref: record.xref().unwrap_or_default().to_string(),
            name: record.subrecord("NAME").and_then(person_name),
            sex: record.subrecord_text("SEX"),
            birth: event(record.subrecord("BIRT")),
            death: event(record.subrecord("DEAT")),
            media: self.highlighted_media(record),
            child_families: Vec::new(),
            spouse_families: Vec::new(),
            restricted: restriction
                .split(',')
                .map(str::trim)
                .any(|r| r == "confidential" || r == "privacy"),
            deceased: ["DEAT", "BURI", "CREM"]
                .iter()
                .any(|tag| record.subrecord(tag).is_some()),
        }
    }

    /// The first linked object flagged as primary, or else the first
    /// linked object that has a file.
    fn highlighted_media(&self, record: &RawRecord<'_>) -> Option<MediaRecord> {
        let objects: Vec<MediaObject> = record
            .subrecords("OBJE")
            .filter_map(|link| match link.pointer() {
                Some(xref) => {
                    let Some(object) = self.pending.media.get(xref) else {
                        warn!(xref, "dangling pointer to media object");
                        return None;
                    };

                    let mut media = self.media_object(object, Some(xref));
                    media.primary |= is_primary(link);
                    Some(media)
                }
                None => Some(self.media_object(link, None)),
            })
            .filter(|media| media.file.is_some())
            .collect();

        let chosen = objects
            .iter()
            .position(|media| media.primary)
            .unwrap_or_default();

        objects.into_iter().nth(chosen)?.into_record()
    }

    fn media_object(&self, record: &RawRecord<'_>, xref: Option<&str>) -> MediaObject {
        let file_record = record.subrecord("FILE");
        let file = file_record
            .and_then(RawRecord::text)
            .map(|file| file.trim().to_string());
        let title = record
            .subrecord_text("TITL")
            .or_else(|| file_record.and_then(|f| f.subrecord_text("TITL")));

        let dimension = |tag| {
            record
                .subrecord_text(tag)
                .and_then(|value| value.parse::<u32>().ok())
        };

        let thumbnail = record.subrecord_text("_THUM").filter(|thumb| {
            // `_THUM Y` is a flag used by some programs, not a file
            !matches!(thumb.to_ascii_uppercase().as_str(), "Y" | "N")
        });

        MediaObject {
            uri: xref.map(|xref| {
                self.base_url
                    .resource(["tree", self.context.name(), "media", xref])
            }),
            title,
            caption: record.subrecord_text("NOTE"),
            file: file.map(|file| MediaFile {
                path: self.media_path(&file),
                width: dimension("_WIDTH"),
                height: dimension("_HEIGHT"),
            }),
            thumbnail: thumbnail.map(|file| MediaFile {
                path: self.media_path(&file),
                width: None,
                height: None,
            }),
            primary: is_primary(record),
        }
    }

    fn media_path(&self, file: &str) -> String {
        let file = file.trim().replace('\\', "/");
        let segments = file.split('/').filter(|segment| !segment.is_empty());
        self.base_url
            .relative(["media", self.context.name()].into_iter().chain(segments))
    }
}

fn is_primary(record: &RawRecord<'_>) -> bool {
    record
        .subrecord_text("_PRIM")
        .is_some_and(|v| v.eq_ignore_ascii_case("Y"))
}

fn event(record: Option<&RawRecord<'_>>) -> Event {
    let Some(record) = record else {
        return Event::default();
    };

    Event {
        date: record
            .subrecord_text("DATE")
            .map(|date| GedcomDate::parse(&date).to_record_date()),
        place: record.subrecord_text("PLAC"),
    }
}

/// A handle to one individual in a [`GedcomTree`].
#[derive(Debug, Clone)]
pub struct IndividualRef {
    tree: Arc<GedcomTree>,
    index: usize,
}

impl IndividualRef {
    pub(crate) fn data(&self) -> &IndividualData {
        &self.tree.individuals[self.index]
    }

    fn relative(&self, index: usize) -> IndividualRef {
        IndividualRef {
            tree: self.tree.clone(),
            index,
        }
    }

    fn family(&self, index: usize) -> Family<IndividualRef> {
        let family = &self.tree.families[index];
        Family {
            husband: family.husband.map(|ix| self.relative(ix)),
            wife: family.wife.map(|ix| self.relative(ix)),
            children: family.children.iter().map(|&ix| self.relative(ix)).collect(),
        }
    }

    fn place(&self, place: Option<&str>) -> Option<RecordPlace> {
        let display = place?.trim();
        if display.is_empty() {
            return None;
        }

        let tree = self.tree.context.name();
        Some(RecordPlace {
            display: display.to_string(),
            uri: Some(
                self.tree
                    .base_url
                    .resource(["tree", tree, "place", display]),
            ),
        })
    }
}

impl IndividualRecord for IndividualRef {
    fn xref(&self) -> &str {
        &self.data().xref
    }

    fn uri(&self) -> Option<String> {
        let tree = self.tree.context.name();
        Some(
            self.tree
                .base_url
                .resource(["tree", tree, "individual", self.xref()]),
        )
    }

    fn primary_name(&self) -> Option<PersonName> {
        self.data().name.clone()
    }

    fn sex(&self) -> Option<String> {
        self.data().sex.clone()
    }

    fn birth_date(&self) -> Option<RecordDate> {
        self.data().birth.date.clone()
    }

    fn death_date(&self) -> Option<RecordDate> {
        self.data().death.date.clone()
    }

    fn birth_place(&self) -> Option<RecordPlace> {
        self.place(self.data().birth.place.as_deref())
    }

    fn death_place(&self) -> Option<RecordPlace> {
        self.place(self.data().death.place.as_deref())
    }

    fn highlighted_media(&self) -> Option<MediaRecord> {
        self.data().media.clone()
    }

    fn primary_child_family(&self) -> Option<Family<Self>> {
        let index = *self.data().child_families.first()?;
        Some(self.family(index))
    }

    fn spouse_families(&self) -> Vec<Family<Self>> {
        self.data()
            .spouse_families
            .iter()
            .map(|&ix| self.family(ix))
            .collect()
    }
}

/// A set of loaded trees, addressed by name.
#[derive(Debug, Default)]
pub struct GedcomStore {
    trees: BTreeMap<String, Arc<GedcomTree>>,
}

impl GedcomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tree, replacing any previous tree of the same name.
    pub fn insert(&mut self, tree: GedcomTree) {
        self.trees
            .insert(tree.context.name().to_string(), Arc::new(tree));
    }

    pub fn with_tree(mut self, tree: GedcomTree) -> Self {
        self.insert(tree);
        self
    }

    pub fn trees(&self) -> impl Iterator<Item = &TreeContext> {
        self.trees.values().map(|tree| &tree.context)
    }
}

impl RecordStore for GedcomStore {
    type Individual = IndividualRef;

    fn resolve(&self, tree: &TreeContext, xref: &str) -> Option<IndividualRef> {
        let gedcom = self.trees.get(tree.name())?;
        let xref = xref.trim_start_matches('@').trim_end_matches('@');
        let index = *gedcom.index.get(xref)?;
        Some(IndividualRef {
            tree: gedcom.clone(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> StoreOptions {
        StoreOptions::new(BaseUrl::parse("http://localhost/").unwrap())
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        assert_eq!(decode(strip_bom(b"\xEF\xBB\xBF0 HEAD")).unwrap(), "0 HEAD");

        let tree =
            GedcomTree::from_bytes("bom.ged", "t", b"\xEF\xBB\xBF0 @I1@ INDI\n0 TRLR", &options())
                .unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn labels_point_past_the_byte_order_mark() {
        let report = GedcomTree::from_bytes(
            "bom.ged",
            "t",
            b"\xEF\xBB\xBF0 HEAD\n1 NOTE caf\xE9",
            &options(),
        )
        .unwrap_err();

        let label = report.labels().unwrap().next().unwrap();
        let source = report.source_code().unwrap();
        let contents = source.read_span(label.inner(), 0, 0).unwrap();
        assert_eq!(contents.data(), b"\xE9");
    }

    #[test]
    fn invalid_utf8_points_at_the_first_bad_byte() {
        let err = decode(b"0 HEAD\n1 NOTE caf\xE9").unwrap_err();
        let LoadError::NotUtf8 { span, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(span.offset(), 17);
    }
}
