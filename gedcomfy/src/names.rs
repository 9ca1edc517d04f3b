use jsonld::PersonName;

use crate::records::RawRecord;

/// Reads a `NAME` structure.
///
/// The surname is delimited by slashes in the name value (`John /Doe/`);
/// explicit `GIVN` and `SURN` parts take precedence over that.
pub(crate) fn person_name(name: &RawRecord<'_>) -> Option<PersonName> {
    let value = name.text().unwrap_or_default();
    let (before, in_value, after) = match value.split_once('/') {
        Some((before, rest)) => {
            let (surname, after) = rest.split_once('/').unwrap_or((rest, ""));
            (before, Some(surname), after)
        }
        None => (value.as_str(), None, ""),
    };

    let given = name
        .subrecord_text("GIVN")
        .or_else(|| non_empty(before))
        .map(|given| collapse(&given));
    let surname = name
        .subrecord_text("SURN")
        .or_else(|| in_value.and_then(non_empty))
        .map(|surname| collapse(&surname));

    let mut given_part = collapse(before);
    let mut surname_part = collapse(in_value.unwrap_or_default());
    let after_part = collapse(after);
    if given_part.is_empty() && surname_part.is_empty() && after_part.is_empty() {
        given_part = given.clone().unwrap_or_default();
        surname_part = surname.clone().unwrap_or_default();
    }

    let mut parts = Vec::new();
    parts.extend(name.subrecord_text("NPFX").filter(|p| !given_part.contains(p.as_str())));
    parts.push(given_part);
    parts.extend(
        name.subrecord_text("NICK")
            .filter(|n| !value.contains(n.as_str()))
            .map(|nick| format!("\"{nick}\"")),
    );
    parts.push(surname_part);
    parts.extend(name.subrecord_text("NSFX").filter(|s| !after_part.contains(s.as_str())));
    parts.push(after_part);

    let full = collapse(&parts.join(" "));
    if full.is_empty() {
        return None;
    }

    Some(PersonName {
        full,
        given,
        surname,
    })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
