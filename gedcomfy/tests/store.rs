use gedcomfy::{GedcomStore, GedcomTree, LoadError, PrivacyPolicy, StoreOptions};
use indoc::indoc;
use jsonld::{
    html, BaseUrl, IndividualRecord, NotFoundOrForbidden, ProjectionOptions, RecordStore,
    RenderError, TreeContext,
};

const DEMO: &str = indoc! {"
    0 HEAD
    1 GEDC
    2 VERS 5.5.1
    1 CHAR UTF-8
    0 @I1@ INDI
    1 NAME John /Doe/
    1 SEX M
    1 BIRT
    2 DATE 1 JAN 1950
    2 PLAC New York, USA
    1 DEAT
    2 DATE 15 MAR 2020
    2 PLAC Boston, USA
    1 FAMS @F1@
    1 OBJE @M1@
    0 @I2@ INDI
    1 NAME Robert /Doe/
    1 SEX M
    1 BIRT
    2 DATE BET 1975 AND 1976
    1 FAMC @F1@
    0 @I3@ INDI
    1 NAME Jane /Roe/
    1 SEX F
    1 RESN privacy
    1 FAMS @F1@
    0 @F1@ FAM
    1 HUSB @I1@
    1 WIFE @I3@
    1 CHIL @I2@
    1 CHIL @I9@
    0 @M1@ OBJE
    1 FILE photos/john.jpg
    2 FORM jpg
    1 TITL John in 1970
    1 _PRIM Y
    1 _WIDTH 640
    1 _HEIGHT 480
    0 TRLR
"};

fn base_url() -> BaseUrl {
    BaseUrl::parse("http://localhost/").unwrap()
}

fn demo_store() -> GedcomStore {
    let tree = GedcomTree::parse("demo", DEMO, &StoreOptions::new(base_url())).unwrap();
    GedcomStore::new().with_tree(tree)
}

fn render(store: &GedcomStore, policy: PrivacyPolicy, xref: &str) -> Result<String, RenderError> {
    jsonld::render(
        store,
        &policy,
        &ProjectionOptions::new(base_url()),
        &TreeContext::new("demo"),
        xref,
    )
}

#[test]
fn render_individual() {
    let store = demo_store();
    let json = render(&store, PrivacyPolicy::RespectRestrictions, "I1").unwrap();

    insta::assert_snapshot!(json, @r#"
    {
      "@context": "http://schema.org",
      "@type": "Person",
      "@id": "http://localhost/tree/demo/individual/I1",
      "name": "John Doe",
      "givenName": "John",
      "familyName": "Doe",
      "gender": "M",
      "birthDate": "1950-01-01",
      "birthPlace": {
        "@type": "Place",
        "@id": "http://localhost/tree/demo/place/New%20York,%20USA",
        "name": "New York, USA"
      },
      "deathDate": "2020-03-15",
      "deathPlace": {
        "@type": "Place",
        "@id": "http://localhost/tree/demo/place/Boston,%20USA",
        "name": "Boston, USA"
      },
      "image": {
        "@type": "ImageObject",
        "@id": "http://localhost/tree/demo/media/M1",
        "contentUrl": "http://localhost/media/demo/photos/john.jpg",
        "name": "John in 1970",
        "width": 640,
        "height": 480
      },
      "children": [
        {
          "@type": "Person",
          "@id": "http://localhost/tree/demo/individual/I2",
          "name": "Robert Doe",
          "givenName": "Robert",
          "familyName": "Doe",
          "gender": "M",
          "birthDate": "1975/1976"
        }
      ]
    }
    "#);
}

#[test]
fn restricted_parent_is_hidden() {
    let store = demo_store();
    let person = jsonld::project(
        &store,
        &PrivacyPolicy::RespectRestrictions,
        &ProjectionOptions::new(base_url()),
        &TreeContext::new("demo"),
        "I2",
    )
    .unwrap();

    let parents: Vec<_> = person.parents.iter().filter_map(|p| p.name.as_deref()).collect();
    assert_eq!(parents, ["John Doe"]);

    let person = jsonld::project(
        &store,
        &PrivacyPolicy::ShowAll,
        &ProjectionOptions::new(base_url()),
        &TreeContext::new("demo"),
        "I2",
    )
    .unwrap();

    let parents: Vec<_> = person.parents.iter().filter_map(|p| p.name.as_deref()).collect();
    assert_eq!(parents, ["John Doe", "Jane Roe"]);
}

#[test]
fn restricted_root_is_forbidden() {
    let store = demo_store();
    let err = render(&store, PrivacyPolicy::RespectRestrictions, "I3").unwrap_err();
    insta::assert_snapshot!(err, @"Individual I3 may not be shown");

    assert!(render(&store, PrivacyPolicy::ShowAll, "I3").is_ok());
}

#[test]
fn living_people_can_be_hidden() {
    let store = demo_store();
    assert!(render(&store, PrivacyPolicy::HideLiving, "I1").is_ok());

    let err = render(&store, PrivacyPolicy::HideLiving, "I2").unwrap_err();
    assert!(matches!(
        err,
        RenderError::NotFoundOrForbidden(NotFoundOrForbidden::Forbidden { .. })
    ));
}

#[test]
fn unknown_individual_or_tree() {
    let store = demo_store();
    let err = render(&store, PrivacyPolicy::ShowAll, "I9").unwrap_err();
    insta::assert_snapshot!(err, @"No individual I9 in tree 'demo'");

    assert!(store.resolve(&TreeContext::new("other"), "I1").is_none());
}

#[test]
fn xrefs_may_be_given_with_at_signs() {
    let store = demo_store();
    let record = store.resolve(&TreeContext::new("demo"), "@I2@").unwrap();
    assert_eq!(record.xref(), "I2");
}

#[test]
fn tab_content_needs_a_name_and_permission() {
    let store = demo_store();
    let tree = TreeContext::new("demo");

    let john = store.resolve(&tree, "I1").unwrap();
    assert!(html::has_tab_content(&john, &PrivacyPolicy::RespectRestrictions));

    let jane = store.resolve(&tree, "I3").unwrap();
    assert!(!html::has_tab_content(&jane, &PrivacyPolicy::RespectRestrictions));
    assert!(html::has_tab_content(&jane, &PrivacyPolicy::ShowAll));
}

#[test]
fn primary_media_is_preferred() {
    let source = indoc! {"
        0 @I1@ INDI
        1 NAME Ann /Lee/
        1 OBJE @M1@
        1 OBJE @M2@
        2 _PRIM Y
        1 OBJE
        2 FILE inline.png
        0 @M1@ OBJE
        1 FILE first.jpg
        0 @M2@ OBJE
        1 FILE second.jpg
        1 _THUM thumbs/second.jpg
        1 NOTE Ann, <i>aged</i> 3
        0 TRLR
    "};

    let tree = GedcomTree::parse("t", source, &StoreOptions::new(base_url())).unwrap();
    let store = GedcomStore::new().with_tree(tree);
    let record = store.resolve(&TreeContext::new("t"), "I1").unwrap();

    let media = record.highlighted_media().unwrap();
    assert_eq!(media.uri.as_deref(), Some("http://localhost/tree/t/media/M2"));
    assert_eq!(media.file.path, "media/t/second.jpg");
    assert_eq!(media.caption.as_deref(), Some("Ann, <i>aged</i> 3"));
    assert_eq!(
        media.thumbnail.map(|t| t.path).as_deref(),
        Some("media/t/thumbs/second.jpg")
    );
}

#[test]
fn inline_media_without_a_flag() {
    let source = indoc! {"
        0 @I1@ INDI
        1 OBJE
        2 FILE C:\\photos\\inline.png
        2 TITL Inline
        0 TRLR
    "};

    let tree = GedcomTree::parse("t", source, &StoreOptions::new(base_url())).unwrap();
    let store = GedcomStore::new().with_tree(tree);
    let record = store.resolve(&TreeContext::new("t"), "I1").unwrap();

    let media = record.highlighted_media().unwrap();
    assert_eq!(media.uri, None);
    assert_eq!(media.title.as_deref(), Some("Inline"));
    assert_eq!(media.file.path, "media/t/C:/photos/inline.png");
}

#[test]
fn media_file_names_are_encoded() {
    let source = indoc! {"
        0 @I1@ INDI
        1 NAME Ann /Lee/
        1 OBJE
        2 FILE my photos/my photo #1.jpg
        0 TRLR
    "};

    let tree = GedcomTree::parse("t", source, &StoreOptions::new(base_url())).unwrap();
    let store = GedcomStore::new().with_tree(tree);
    let person = jsonld::project(
        &store,
        &PrivacyPolicy::ShowAll,
        &ProjectionOptions::new(base_url()),
        &TreeContext::new("t"),
        "I1",
    )
    .unwrap();

    let image = person.image.unwrap();
    assert_eq!(
        image.content_url.as_deref(),
        Some("http://localhost/media/t/my%20photos/my%20photo%20%231.jpg")
    );
}

#[test]
fn syntax_errors_are_collected() {
    let source = indoc! {"
        0 HEAD
        x BAD
        0 @VOID@ INDI
        0 TRLR
    "};

    let err = GedcomTree::parse("t", source, &StoreOptions::new(base_url())).unwrap_err();
    insta::assert_snapshot!(err, @"2 syntax errors detected");

    let LoadError::SyntaxErrorsDetected { errors } = err else {
        panic!("unexpected error");
    };
    assert_eq!(errors.len(), 2);
}

#[test]
fn structure_errors() {
    let source = indoc! {"
        0 @I1@ INDI
        2 NAME Skipped /Level/
    "};

    let err = GedcomTree::parse("t", source, &StoreOptions::new(base_url())).unwrap_err();
    insta::assert_snapshot!(err, @"Invalid child level 2, expected 1 or less");
}
