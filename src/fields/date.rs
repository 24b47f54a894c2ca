//! Date field: `{{#DATE <format>#}}`.

use super::{Field, RenderContext};
use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write as _;

/// Renders a fixed date with the strftime-style format embedded in the
/// placeholder, e.g. `{{#DATE %d %B %Y#}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateField {
    date: NaiveDateTime,
}

impl DateField {
    /// Input format used when none is configured.
    pub const DEFAULT_INPUT_FORMAT: &'static str = "%Y-%m-%d";

    /// Use the given date.
    pub fn new(date: NaiveDateTime) -> Self {
        Self { date }
    }

    /// Use the current local date and time.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parse a configured date string.
    ///
    /// `format` may describe a full date-time or only a date, in which case
    /// the time is midnight.
    pub fn parse(value: &str, format: &str) -> Result<Self> {
        let value = value.trim();
        let date = NaiveDateTime::parse_from_str(value, format)
            .or_else(|_| {
                NaiveDate::parse_from_str(value, format).map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|e| {
                Error::Format(format!(
                    "date '{}' does not match format '{}': {}",
                    value, format, e
                ))
            })?;
        Ok(Self::new(date))
    }

    /// The configured date.
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// Render the date with a strftime-style format.
    pub fn format(&self, format: &str) -> Result<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(Error::Format(format!("invalid date format '{}'", format)));
        }

        let mut out = String::new();
        write!(out, "{}", self.date.format_with_items(items.iter())).map_err(|_| {
            Error::Format(format!("date format '{}' cannot be applied to a date", format))
        })?;
        Ok(out)
    }
}

fn embedded_format(body: &str) -> Option<&str> {
    body.strip_prefix("#DATE")?
        .strip_suffix('#')
        .map(str::trim)
}

impl Field for DateField {
    fn key(&self) -> &'static str {
        "date"
    }

    fn recognizes(&self, body: &str) -> bool {
        embedded_format(body).is_some()
    }

    fn render(&self, body: &str, _ctx: &RenderContext) -> Result<String> {
        let format = embedded_format(body)
            .ok_or_else(|| Error::Format(format!("'{}' is not a date field", body)))?;
        self.format(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> DateField {
        DateField::parse("2008-03-14", DateField::DEFAULT_INPUT_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_date_only() {
        let date = field().date();
        assert_eq!(date.to_string(), "2008-03-14 00:00:00");
    }

    #[test]
    fn test_parse_date_time() {
        let field = DateField::parse("14/03/2008 17:45", "%d/%m/%Y %H:%M").unwrap();
        assert_eq!(field.format("%H:%M").unwrap(), "17:45");
    }

    #[test]
    fn test_parse_failure() {
        assert!(matches!(
            DateField::parse("yesterday", DateField::DEFAULT_INPUT_FORMAT),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_substitute_each_occurrence_with_its_format() {
        let ctx = RenderContext::new(1, 1);
        let out = field()
            .substitute("{{#DATE %Y#}} / {{ #DATE %d.%m. # }}", &ctx)
            .unwrap();
        assert_eq!(out, "2008 / 14.03.");
    }

    #[test]
    fn test_empty_format_renders_nothing() {
        let ctx = RenderContext::new(1, 1);
        assert!(field().matches("{{#DATE#}}"));
        assert_eq!(field().substitute("[{{#DATE#}}]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn test_malformed_format() {
        let ctx = RenderContext::new(1, 1);
        assert!(matches!(
            field().substitute("{{#DATE %Q#}}", &ctx),
            Err(Error::Format(_))
        ));
        // Time zone specifiers cannot be rendered for a naive date.
        assert!(matches!(field().format("%z"), Err(Error::Format(_))));
    }

    #[test]
    fn test_not_a_date_placeholder() {
        assert!(!field().matches("{{#DATE}}"));
        assert!(!field().matches("{{#PAGE#}}"));
    }
}
