use serde::Serialize;

/// The schema.org types that can appear in a document.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Person,
    ImageObject,
    Place,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Person => "Person",
            NodeType::ImageObject => "ImageObject",
            NodeType::Place => "Place",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The JSON-LD keywords shared by every node.
///
/// `@type` is fixed when the node is created. `@context` is not part of
/// the envelope at all: it is only ever added to the root of a document,
/// by [`serialize`](crate::serialize).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    #[serde(rename = "@type")]
    kind: NodeType,
    #[serde(rename = "@id")]
    id: Option<String>,
}

impl Envelope {
    fn new(kind: NodeType) -> Self {
        Self { kind, id: None }
    }

    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Sets `@id`; an empty identifier leaves the node without one.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = (!id.is_empty()).then_some(id);
    }
}

/// A node that can be the subject of a JSON-LD document.
pub trait JsonLdNode: Serialize {
    fn envelope(&self) -> &Envelope;
    fn envelope_mut(&mut self) -> &mut Envelope;

    fn node_type(&self) -> NodeType {
        self.envelope().kind()
    }

    fn id(&self) -> Option<&str> {
        self.envelope().id()
    }

    fn set_id(&mut self, id: impl Into<String>) {
        self.envelope_mut().set_id(id)
    }
}

macro_rules! impl_node {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl JsonLdNode for $ty {
                fn envelope(&self) -> &Envelope {
                    &self.envelope
                }

                fn envelope_mut(&mut self) -> &mut Envelope {
                    &mut self.envelope
                }
            }
        )+
    };
}

impl_node!(Person, ImageObject, Thumbnail, Place);

/// Sex codes as used in genealogical records.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    /// Interprets a record's sex code. Anything other than `M` or `F`
    /// (in either case) is [`Gender::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            c if c.eq_ignore_ascii_case("M") => Gender::Male,
            c if c.eq_ignore_ascii_case("F") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// <https://schema.org/Person>
///
/// Field order here is the order of keys in the emitted document.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(flatten)]
    envelope: Envelope,
    pub name: Option<String>,
    /// First name, personal name, forename, christian name.
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub gender: Option<Gender>,
    /// `YYYY-MM-DD`, or `YYYY/YYYY` when only a range of years is known.
    pub birth_date: Option<String>,
    pub birth_place: Option<Place>,
    pub death_date: Option<String>,
    pub death_place: Option<Place>,
    pub image: Option<ImageObject>,
    pub parents: Vec<Person>,
    /// The children of this person, regardless of their families.
    pub children: Vec<Person>,
    pub address: Vec<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

impl Person {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(NodeType::Person),
            name: None,
            given_name: None,
            family_name: None,
            gender: None,
            birth_date: None,
            birth_place: None,
            death_date: None,
            death_place: None,
            image: None,
            parents: Vec::new(),
            children: Vec::new(),
            address: Vec::new(),
            email: None,
            url: None,
        }
    }

    pub fn add_parent(&mut self, parent: Person) {
        self.parents.push(parent);
    }

    pub fn add_child(&mut self, child: Person) {
        self.children.push(child);
    }

    pub fn add_address(&mut self, address: impl Into<String>) {
        self.address.push(address.into());
    }
}

impl Default for Person {
    fn default() -> Self {
        Self::new()
    }
}

/// <https://schema.org/ImageObject>
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    #[serde(flatten)]
    envelope: Envelope,
    pub content_url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Width of the image in pixels.
    pub width: Option<u32>,
    /// Height of the image in pixels.
    pub height: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

impl ImageObject {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(NodeType::ImageObject),
            content_url: None,
            name: None,
            description: None,
            width: None,
            height: None,
            thumbnail_url: None,
            thumbnail: None,
        }
    }
}

impl Default for ImageObject {
    fn default() -> Self {
        Self::new()
    }
}

/// The thumbnail rendition of an [`ImageObject`].
///
/// This is emitted as an `ImageObject` too, but has no thumbnail of its own.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    #[serde(flatten)]
    envelope: Envelope,
    pub content_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Thumbnail {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(NodeType::ImageObject),
            content_url: None,
            width: None,
            height: None,
        }
    }
}

impl Default for Thumbnail {
    fn default() -> Self {
        Self::new()
    }
}

/// <https://schema.org/Place>
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Place {
    #[serde(flatten)]
    envelope: Envelope,
    pub name: Option<String>,
    pub geo: Option<String>,
    pub address: Option<String>,
}

impl Place {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(NodeType::Place),
            name: None,
            geo: None,
            address: None,
        }
    }
}

impl Default for Place {
    fn default() -> Self {
        Self::new()
    }
}
