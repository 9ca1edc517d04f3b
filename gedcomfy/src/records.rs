use miette::SourceSpan;

use crate::{lines::RawLine, Sourced};

/// Represents an assembled GEDCOM record, or sub-record,
/// with its children.
#[derive(Debug)]
pub struct RawRecord<'i> {
    pub line: Sourced<RawLine<'i>>,
    pub records: Vec<Sourced<RawRecord<'i>>>,
}

impl<'i> RawRecord<'i> {
    fn new(line: Sourced<RawLine<'i>>) -> Self {
        Self {
            line,
            records: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        self.line.tag.value.as_str()
    }

    /// The record's own xref, without the surrounding `@`s.
    pub fn xref(&self) -> Option<&'i str> {
        self.line.xref.map(|xref| strip_at(xref.value))
    }

    /// The value of the line, ignoring any continuation lines.
    pub fn value(&self) -> Option<&'i str> {
        self.line.data.map(|data| data.value)
    }

    /// The value of the line if it is a pointer to another record,
    /// without the surrounding `@`s.
    pub fn pointer(&self) -> Option<&'i str> {
        self.value()
            .map(str::trim)
            .filter(|v| v.len() > 2 && v.starts_with('@') && v.ends_with('@'))
            .map(strip_at)
    }

    /// The full value of the record, with `CONT` and `CONC`
    /// continuation lines folded in.
    pub fn text(&self) -> Option<String> {
        let mut text = self.value().unwrap_or_default().to_string();
        for child in &self.records {
            match child.tag() {
                "CONT" => {
                    text.push('\n');
                    text.push_str(child.value().unwrap_or_default());
                }
                "CONC" => text.push_str(child.value().unwrap_or_default()),
                _ => {}
            }
        }

        (!text.trim().is_empty()).then_some(text)
    }

    pub fn subrecord(&self, tag: &str) -> Option<&RawRecord<'i>> {
        self.records.iter().map(|r| &r.value).find(|r| r.tag() == tag)
    }

    pub fn subrecords<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'s RawRecord<'i>> {
        self.records
            .iter()
            .map(|r| &r.value)
            .filter(move |r| r.tag() == tag)
    }

    /// The trimmed text of the first `tag` subrecord, if it has any.
    pub fn subrecord_text(&self, tag: &str) -> Option<String> {
        self.subrecord(tag)
            .and_then(RawRecord::text)
            .map(|text| text.trim().to_string())
    }
}

fn strip_at(value: &str) -> &str {
    value.trim_start_matches('@').trim_end_matches('@')
}

#[derive(derive_more::Error, derive_more::Display, Debug, miette::Diagnostic)]
pub enum RecordStructureError {
    #[display("Invalid child level {level}, expected {expected_level} or less")]
    #[diagnostic(code(gedcom::record_error::invalid_child_level))]
    InvalidChildLevel {
        level: usize,
        expected_level: usize,
        #[label("this should be less than or equal to {expected_level}")]
        span: SourceSpan,
    },
}

/// Assembles lines into records, emitting each top-level
/// record once the next one starts.
pub(crate) struct RecordBuilder<'i> {
    stack: Vec<RawRecord<'i>>,
}

impl<'i> RecordBuilder<'i> {
    pub(crate) fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn pop_to_level(&mut self, level: usize) -> Option<Sourced<RawRecord<'i>>> {
        while self.stack.len() > level {
            let child = self.stack.pop()?;

            if child.records.is_empty()
                && child.line.data.is_none()
                && !matches!(child.tag(), "CONT" | "CONC" | "TRLR")
            {
                tracing::warn!(
                    tag = child.tag(),
                    offset = child.line.span.offset(),
                    "record has neither a value nor subrecords"
                );
            }

            let span = if let Some(last_child) = child.records.last() {
                // if the child has children, re-calculate the span of the record,
                // so that each record has a span that covers all its children
                let child_offset = child.line.span.offset();
                let len = last_child.span.offset() + last_child.span.len() - child_offset;
                SourceSpan::from((child_offset, len))
            } else {
                // otherwise just use the span of the line
                child.line.span
            };

            let sourced = Sourced { value: child, span };

            match self.stack.last_mut() {
                None => {
                    debug_assert_eq!(level, 0); // only happens when popping to top level
                    return Some(sourced);
                }
                Some(parent) => {
                    parent.records.push(sourced);
                }
            }
        }

        None
    }

    pub(crate) fn handle_line(
        &mut self,
        (level, line): (Sourced<usize>, Sourced<RawLine<'i>>),
    ) -> Result<Option<Sourced<RawRecord<'i>>>, RecordStructureError> {
        let to_emit = self.pop_to_level(level.value);

        let expected_level = self.stack.len();
        if level.value != expected_level {
            return Err(RecordStructureError::InvalidChildLevel {
                level: level.value,
                expected_level,
                span: level.span,
            });
        }

        self.stack.push(RawRecord::new(line));

        Ok(to_emit)
    }

    pub(crate) fn complete(mut self) -> Option<Sourced<RawRecord<'i>>> {
        self.pop_to_level(0)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::lines::iterate_lines;

    fn build(input: &str) -> Result<Vec<Sourced<RawRecord<'_>>>, RecordStructureError> {
        let mut builder = RecordBuilder::new();
        let mut records = Vec::new();
        for line in iterate_lines(input) {
            records.extend(builder.handle_line(line.unwrap())?);
        }

        records.extend(builder.complete());
        Ok(records)
    }

    #[test]
    fn nesting() {
        let records = build(indoc! {"
            0 @I1@ INDI
            1 NAME John /Doe/
            2 GIVN John
            1 SEX M
            0 TRLR
        "})
        .unwrap();

        assert_eq!(records.len(), 2);
        let indi = &records[0];
        assert_eq!(indi.xref(), Some("I1"));
        assert_eq!(indi.records.len(), 2);
        assert_eq!(indi.subrecord_text("SEX").as_deref(), Some("M"));
        assert_eq!(
            indi.subrecord("NAME").and_then(|n| n.subrecord_text("GIVN")).as_deref(),
            Some("John")
        );
    }

    #[test]
    fn continuation_lines_are_folded() {
        let records = build(indoc! {"
            0 @N1@ NOTE First line
            1 CONT second li
            1 CONC ne
            1 CONT
            1 CONT last
        "})
        .unwrap();

        assert_eq!(
            records[0].text().as_deref(),
            Some("First line\nsecond line\n\nlast")
        );
    }

    #[test]
    fn pointers() {
        let records = build(indoc! {"
            0 @F1@ FAM
            1 HUSB @I1@
            1 NOTE @not a pointer
        "})
        .unwrap();

        assert_eq!(records[0].subrecord("HUSB").and_then(RawRecord::pointer), Some("I1"));
        assert_eq!(records[0].subrecord("NOTE").and_then(RawRecord::pointer), None);
    }

    #[test]
    fn subrecord_outlives_its_tag() {
        let records = build(indoc! {"
            0 @F1@ FAM
            1 CHIL @I1@
            1 CHIL @I2@
        "})
        .unwrap();

        let child = {
            let tag = String::from("CHIL");
            records[0].subrecord(&tag)
        };
        assert_eq!(child.and_then(RawRecord::pointer), Some("I1"));

        let children: Vec<_> = records[0]
            .subrecords("CHIL")
            .filter_map(RawRecord::pointer)
            .collect();
        assert_eq!(children, ["I1", "I2"]);
    }

    #[test]
    fn skipped_level_is_an_error() {
        let err = build(indoc! {"
            0 @I1@ INDI
            2 GIVN John
        "})
        .unwrap_err();

        insta::assert_snapshot!(err, @"Invalid child level 2, expected 1 or less");
    }
}
