//! GEDCOM date values.
//!
//! Only the Gregorian calendar is understood. Anything that cannot be
//! parsed is kept as a [`GedcomDate::Phrase`] so it can still be shown.

use std::fmt;

use jsonld::RecordDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleDate {
    Y(i32),
    YM(i32, u8),
    YMD(i32, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    About,
    Before,
    After,
    Estimated,
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GedcomDate {
    Simple(SimpleDate),
    Approximate(Qualifier, SimpleDate),
    Between(SimpleDate, SimpleDate),
    Period {
        from: Option<SimpleDate>,
        to: Option<SimpleDate>,
    },
    Phrase(String),
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

impl SimpleDate {
    pub fn year(self) -> i32 {
        match self {
            SimpleDate::Y(y) | SimpleDate::YM(y, _) | SimpleDate::YMD(y, _, _) => y,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        match parts.as_slice() {
            [year] => Some(SimpleDate::Y(parse_year(year)?)),
            [month, year] => Some(SimpleDate::YM(parse_year(year)?, parse_month(month)?)),
            [day, month, year] => {
                let year = parse_year(year)?;
                let month = parse_month(month)?;
                let day = day.parse::<u8>().ok()?;
                (1..=days_in_month(year, month))
                    .contains(&day)
                    .then_some(SimpleDate::YMD(year, month, day))
            }
            _ => None,
        }
    }
}

fn parse_year(value: &str) -> Option<i32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    value.parse().ok()
}

fn parse_month(value: &str) -> Option<u8> {
    let ix = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(value))?;
    u8::try_from(ix + 1).ok()
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 31,
    }
}

impl fmt::Display for SimpleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = |m: u8| MONTHS[usize::from(m.clamp(1, 12)) - 1];
        match *self {
            SimpleDate::Y(y) => write!(f, "{y}"),
            SimpleDate::YM(y, m) => write!(f, "{} {y}", month(m)),
            SimpleDate::YMD(y, m, d) => write!(f, "{d} {} {y}", month(m)),
        }
    }
}

impl Qualifier {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword.to_ascii_uppercase().as_str() {
            "ABT" => Qualifier::About,
            "BEF" => Qualifier::Before,
            "AFT" => Qualifier::After,
            "EST" => Qualifier::Estimated,
            "CAL" => Qualifier::Calculated,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Qualifier::About => "about",
            Qualifier::Before => "before",
            Qualifier::After => "after",
            Qualifier::Estimated => "estimated",
            Qualifier::Calculated => "calculated",
        }
    }
}

impl GedcomDate {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let phrase = || GedcomDate::Phrase(value.trim_matches(['(', ')']).trim().to_string());

        let Some((keyword, rest)) = value.split_once(' ') else {
            return SimpleDate::parse(value).map_or_else(phrase, GedcomDate::Simple);
        };

        let upper = keyword.to_ascii_uppercase();
        let parsed = match upper.as_str() {
            "BET" => split_keyword(rest, "AND").and_then(|(min, max)| {
                Some(GedcomDate::Between(
                    SimpleDate::parse(min)?,
                    SimpleDate::parse(max)?,
                ))
            }),
            "FROM" => {
                let (from, to) = split_keyword(rest, "TO").unwrap_or((rest, ""));
                let from = SimpleDate::parse(from);
                let to = if to.is_empty() {
                    None
                } else {
                    Some(SimpleDate::parse(to))
                };

                match (from, to) {
                    (Some(from), None) => Some(GedcomDate::Period {
                        from: Some(from),
                        to: None,
                    }),
                    (Some(from), Some(Some(to))) => Some(GedcomDate::Period {
                        from: Some(from),
                        to: Some(to),
                    }),
                    _ => None,
                }
            }
            "TO" => SimpleDate::parse(rest).map(|to| GedcomDate::Period {
                from: None,
                to: Some(to),
            }),
            _ => match Qualifier::from_keyword(keyword) {
                Some(qualifier) => {
                    SimpleDate::parse(rest).map(|date| GedcomDate::Approximate(qualifier, date))
                }
                None => SimpleDate::parse(value).map(GedcomDate::Simple),
            },
        };

        parsed.unwrap_or_else(phrase)
    }

    /// The textual rendering used by the record store. Only complete dates
    /// render as `YYYY-MM-DD`; every other form has a leading word or
    /// uses month names, so it can never be mistaken for one.
    pub fn to_record_date(&self) -> RecordDate {
        match self {
            GedcomDate::Between(min, max) => {
                RecordDate::between(self.to_string(), min.year(), max.year())
            }
            _ => RecordDate::new(self.to_string()),
        }
    }
}

fn split_keyword<'a>(value: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let mut words = value.match_indices(' ');
    words.find_map(|(ix, _)| {
        let rest = &value[ix + 1..];
        let (word, tail) = rest.split_once(' ').unwrap_or((rest, ""));
        word.eq_ignore_ascii_case(keyword)
            .then(|| (value[..ix].trim(), tail.trim()))
    })
}

impl fmt::Display for GedcomDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GedcomDate::Simple(SimpleDate::YMD(y, m, d)) => write!(f, "{y:04}-{m:02}-{d:02}"),
            GedcomDate::Simple(date) => write!(f, "{date}"),
            GedcomDate::Approximate(qualifier, date) => write!(f, "{} {date}", qualifier.as_str()),
            GedcomDate::Between(min, max) => write!(f, "between {min} and {max}"),
            GedcomDate::Period { from, to } => match (from, to) {
                (Some(from), Some(to)) => write!(f, "from {from} to {to}"),
                (Some(from), None) => write!(f, "from {from}"),
                (None, Some(to)) => write!(f, "to {to}"),
                (None, None) => Ok(()),
            },
            GedcomDate::Phrase(phrase) => f.write_str(phrase),
        }
    }
}
