//! An in-memory record store for tests.

#![allow(dead_code)]

use std::{collections::BTreeMap, rc::Rc};

use jsonld::{
    Family, IndividualRecord, MediaRecord, PersonName, RecordDate, RecordPlace, RecordStore,
    TreeContext, VisibilityGate,
};

#[derive(Default, Clone)]
pub struct FakePerson {
    pub name: Option<PersonName>,
    pub sex: Option<String>,
    pub birth_date: Option<RecordDate>,
    pub death_date: Option<RecordDate>,
    pub birth_place: Option<RecordPlace>,
    pub death_place: Option<RecordPlace>,
    pub media: Option<MediaRecord>,
    pub child_of: Option<String>,
    pub spouse_in: Vec<String>,
    pub private: bool,
}

#[derive(Default, Clone)]
pub struct FakeFamily {
    pub husband: Option<String>,
    pub wife: Option<String>,
    pub children: Vec<String>,
}

#[derive(Default)]
pub struct FakeTree {
    people: BTreeMap<String, FakePerson>,
    families: BTreeMap<String, FakeFamily>,
}

impl FakeTree {
    pub fn person(mut self, xref: &str, person: FakePerson) -> Self {
        self.people.insert(xref.to_string(), person);
        self
    }

    pub fn family(mut self, xref: &str, family: FakeFamily) -> Self {
        self.families.insert(xref.to_string(), family);
        self
    }

    pub fn into_store(self) -> FakeStore {
        FakeStore {
            tree: Rc::new(self),
        }
    }
}

pub struct FakeStore {
    tree: Rc<FakeTree>,
}

pub fn tree() -> TreeContext {
    TreeContext::new("fake")
}

impl RecordStore for FakeStore {
    type Individual = FakeIndividual;

    fn resolve(&self, tree: &TreeContext, xref: &str) -> Option<FakeIndividual> {
        if tree.name() != "fake" || !self.tree.people.contains_key(xref) {
            return None;
        }

        Some(FakeIndividual {
            tree: self.tree.clone(),
            xref: xref.to_string(),
        })
    }
}

#[derive(Clone)]
pub struct FakeIndividual {
    tree: Rc<FakeTree>,
    xref: String,
}

impl FakeIndividual {
    fn data(&self) -> &FakePerson {
        &self.tree.people[&self.xref]
    }

    fn handle(&self, xref: &Option<String>) -> Option<FakeIndividual> {
        let xref = xref.as_ref()?;
        self.tree.people.contains_key(xref).then(|| FakeIndividual {
            tree: self.tree.clone(),
            xref: xref.clone(),
        })
    }

    fn family(&self, xref: &str) -> Option<Family<FakeIndividual>> {
        let family = self.tree.families.get(xref)?;
        Some(Family {
            husband: self.handle(&family.husband),
            wife: self.handle(&family.wife),
            children: family
                .children
                .iter()
                .filter_map(|child| self.handle(&Some(child.clone())))
                .collect(),
        })
    }
}

impl IndividualRecord for FakeIndividual {
    fn xref(&self) -> &str {
        &self.xref
    }

    fn uri(&self) -> Option<String> {
        Some(format!("http://localhost/tree/fake/individual/{}", self.xref))
    }

    fn primary_name(&self) -> Option<PersonName> {
        self.data().name.clone()
    }

    fn sex(&self) -> Option<String> {
        self.data().sex.clone()
    }

    fn birth_date(&self) -> Option<RecordDate> {
        self.data().birth_date.clone()
    }

    fn death_date(&self) -> Option<RecordDate> {
        self.data().death_date.clone()
    }

    fn birth_place(&self) -> Option<RecordPlace> {
        self.data().birth_place.clone()
    }

    fn death_place(&self) -> Option<RecordPlace> {
        self.data().death_place.clone()
    }

    fn highlighted_media(&self) -> Option<MediaRecord> {
        self.data().media.clone()
    }

    fn primary_child_family(&self) -> Option<Family<Self>> {
        let xref = self.data().child_of.as_ref()?;
        self.family(xref)
    }

    fn spouse_families(&self) -> Vec<Family<Self>> {
        self.data()
            .spouse_in
            .iter()
            .filter_map(|xref| self.family(xref))
            .collect()
    }
}

/// Hides everyone marked as private.
pub struct HidePrivate;

impl VisibilityGate<FakeIndividual> for HidePrivate {
    fn can_show(&self, record: &FakeIndividual) -> bool {
        !record.data().private
    }
}

pub fn name(full: &str, given: &str, surname: &str) -> Option<PersonName> {
    Some(PersonName {
        full: full.to_string(),
        given: Some(given.to_string()),
        surname: Some(surname.to_string()),
    })
}

pub fn place(name: &str) -> Option<RecordPlace> {
    Some(RecordPlace {
        display: name.to_string(),
        uri: Some(format!(
            "http://localhost/tree/fake/place/{}",
            name.replace(", ", "-").replace(' ', "_")
        )),
    })
}
