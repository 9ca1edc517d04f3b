use ascii::{AsAsciiStr, AsciiChar, AsciiStr};
use miette::SourceSpan;

use crate::Sourced;

/// Represents a single line in a GEDCOM file.
///
/// Note that we take advantage of the encoding
/// requirements here to make tags less generic,
/// since they must only be part of the ASCII subset.
/// This makes them easier to deal with in code.
#[derive(Debug)]
pub struct RawLine<'a> {
    pub tag: Sourced<&'a AsciiStr>,
    pub xref: Option<Sourced<&'a str>>,
    pub data: Option<Sourced<&'a str>>,
}

/// The types of errors that can occur when parsing lines
/// from a GEDCOM file.
#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum LineSyntaxError {
    #[error("Invalid non-numeric level '{value}'")]
    #[diagnostic(code(gedcom::parse_error::invalid_level))]
    InvalidLevel {
        value: String,
        #[source]
        source: Option<std::num::ParseIntError>,
        #[label("this is not a (positive) number")]
        span: SourceSpan,
    },

    #[error("Reserved value '{reserved_value}' cannot be used as an XRef")]
    #[diagnostic(code(gedcom::parse_error::reserved_xref))]
    ReservedXRef {
        reserved_value: String,
        #[label("{reserved_value} is a reserved value")]
        span: SourceSpan,
    },

    #[error("No tag found")]
    #[diagnostic(code(gedcom::parse_error::no_tag))]
    NoTag {
        #[label("no tag in this line")]
        span: SourceSpan,
    },

    #[error("Invalid character in tag")]
    #[diagnostic(
        code(gedcom::parse_error::invalid_tag),
        help(
            "tag names may only contain the characters a-z, A-Z, and 0-9, or a leading underscore"
        )
    )]
    InvalidTagCharacter {
        #[label("this character is not permitted in a tag")]
        span: SourceSpan,
    },
}

const VOID_POINTER: &str = "@VOID@";

/// The span of `part` within `source`; `part` must be a subslice of `source`.
pub(crate) fn span_of(source: &str, part: &str) -> SourceSpan {
    let offset = (part.as_ptr() as usize).saturating_sub(source.as_ptr() as usize);
    debug_assert!(offset + part.len() <= source.len());
    SourceSpan::from((offset, part.len()))
}

/// GEDCOM lines are terminated by "any combination of a carriage return and a line feed".
fn lines(source: &str) -> impl Iterator<Item = &str> {
    source.split(['\r', '\n'])
}

/// This is a straightforward parser for GEDCOM lines. It performs
/// minimal validation; blank lines are skipped, but a line may not
/// start with whitespace.
///
/// ## Syntax
///
/// ```text
/// Line    = Level D [Xref D] Tag [D LineVal] EOL
///
/// Level   = "0" / nonzero *digit
/// D       = %x20                            ; space
/// Xref    = atsign 1*tagchar atsign         ; but not "@VOID@"
/// Tag     = stdTag / extTag
/// LineVal = pointer / lineStr
/// EOL     = %x0D [%x0A] / %x0A              ; CR-LF, CR, or LF
///
/// stdTag  = ucletter *tagchar
/// extTag  = underscore 1*tagchar
/// tagchar = ucletter / digit / underscore
/// ```
pub fn iterate_lines(
    source_code: &str,
) -> impl Iterator<Item = Result<(Sourced<usize>, Sourced<RawLine<'_>>), LineSyntaxError>> {
    let to_sourced = move |s| Sourced {
        value: s,
        span: span_of(source_code, s),
    };

    lines(source_code).filter_map(move |line| {
        let mut parts = line.splitn(4, ' ').peekable();
        let level_part = parts.next().unwrap_or_default();
        if line.trim().is_empty() {
            return None; // skipping empty line
        }

        let result = || -> Result<_, _> {
            let invalid_level = |source| LineSyntaxError::InvalidLevel {
                source,
                value: level_part.to_string(),
                span: span_of(source_code, level_part),
            };

            // `parse` alone would accept a leading `+`
            if !level_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_level(level_part.parse::<usize>().err()));
            }

            let level = level_part
                .parse::<usize>()
                .map_err(|source| invalid_level(Some(source)))?;

            let level = Sourced {
                value: level,
                span: span_of(source_code, level_part),
            };

            // XRef starts and ends with '@' but interior does not _have_ to be ASCII
            let xref = parts.next_if(|s| s.len() > 1 && s.starts_with('@') && s.ends_with('@'));
            if let Some(xref) = xref {
                // tag may not be the reserved 'null' value
                if xref == VOID_POINTER {
                    return Err(LineSyntaxError::ReservedXRef {
                        reserved_value: VOID_POINTER.to_string(),
                        span: span_of(source_code, xref),
                    });
                }
            }

            let xref = xref.map(to_sourced);

            let source_tag = parts
                .next()
                .filter(|tag| !tag.is_empty())
                .ok_or_else(|| LineSyntaxError::NoTag {
                    span: span_of(source_code, line),
                })?;

            // ensure tag is valid (only ASCII alphanumeric, may have underscore at start)
            let tag = source_tag.as_ascii_str().map_err(|source| {
                // produce error pointing to the first non-valid char
                let full_span = span_of(source_code, source_tag);
                let span = SourceSpan::from((full_span.offset() + source.valid_up_to(), 1));
                LineSyntaxError::InvalidTagCharacter { span }
            })?;

            if let Some((ix, _)) = tag.chars().enumerate().find(|&(ix, char)| {
                if char == AsciiChar::UnderScore {
                    ix > 0
                } else {
                    !char.is_ascii_alphanumeric()
                }
            }) {
                let full_span = span_of(source_code, source_tag);
                let span = SourceSpan::from((full_span.offset() + ix, 1));
                return Err(LineSyntaxError::InvalidTagCharacter { span });
            }

            let tag = Sourced {
                value: tag,
                span: span_of(source_code, source_tag),
            };

            // if there was no xref the value has been split once too often,
            // so re-slice the remainder of the line from the start of the value
            let data = parts.next().map(|p| {
                let offset = span_of(line, p).offset();
                to_sourced(&line[offset..])
            });

            Ok((
                level,
                Sourced {
                    span: span_of(source_code, line),
                    value: RawLine { tag, xref, data },
                },
            ))
        }();

        Some(result)
    })
}
