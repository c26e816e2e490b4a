// Aggregation engine: rows + chart request -> bounded label/value series

use crate::data::Row;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Maximum number of distinct category keys kept in a series.
/// Keys are taken in first-seen order, not by size.
pub const MAX_SERIES_POINTS: usize = 10;

/// Contribution of a row whose measure cell cannot be read as a number.
///
/// Such a row is counted once rather than treated as zero or skipped, so a
/// measure column full of text degrades to a plain row count per category.
pub const UNPARSABLE_MEASURE_CONTRIBUTION: f64 = 1.0;

/// Key used when a row has no value at all for the category column.
pub const MISSING_CATEGORY_KEY: &str = "undefined";

/// Chart geometry requested for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Case-insensitive lookup; anything unrecognised is a bar chart.
    /// Surrounding whitespace is not ignored, so `" pie "` is a bar chart.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "line" => ChartKind::Line,
            "pie" => ChartKind::Pie,
            _ => ChartKind::Bar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name: Option<String> = Option::deserialize(deserializer)?;
        Ok(name.map(|n| ChartKind::from_name(&n)).unwrap_or_default())
    }
}

/// Configuration of one chart slot.
///
/// An empty `category` marks the slot as unused. A missing (or empty)
/// `measure` switches the slot to counting rows.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChartRequest {
    #[serde(
        rename = "x",
        alias = "category",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub category: String,
    #[serde(rename = "y", alias = "measure", default)]
    pub measure: Option<String>,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub title: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl ChartRequest {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_measure(mut self, measure: impl Into<String>) -> Self {
        self.measure = Some(measure.into());
        self
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Measure column, treating an empty name as "count rows"
    pub fn measure_column(&self) -> Option<&str> {
        self.measure.as_deref().filter(|m| !m.is_empty())
    }

    /// Title, treating an empty one as absent
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        !self.category.is_empty()
    }

    /// Label used when the request carries no title:
    /// `"<measure> by <category>"` or `"Count by <category>"`.
    pub fn default_label(&self) -> String {
        match self.measure_column() {
            Some(measure) => format!("{} by {}", measure, self.category),
            None => format!("Count by {}", self.category),
        }
    }
}

/// Chart-ready output of the engine. `labels` and `values` are aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub kind: ChartKind,
    pub title: Option<String>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// Group `rows` on the request's category column and total the measure.
///
/// Returns `None` when the request has no category column (unused slot).
/// Keys keep the order in which they first appear in `rows`; only the first
/// [`MAX_SERIES_POINTS`] keys survive, whatever their totals.
pub fn aggregate(rows: &[Row], request: &ChartRequest) -> Option<Series> {
    if !request.is_configured() {
        return None;
    }

    let measure = request.measure_column();
    let mut order: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = row
            .get(&request.category)
            .unwrap_or(MISSING_CATEGORY_KEY)
            .to_string();

        let contribution = match measure {
            Some(col) => coerce_measure(row.get(col).unwrap_or(""))
                .unwrap_or(UNPARSABLE_MEASURE_CONTRIBUTION),
            None => 1.0,
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            order.push((key, 0.0));
            order.len() - 1
        });
        order[slot].1 += contribution;
    }

    order.truncate(MAX_SERIES_POINTS);
    let (labels, values) = order.into_iter().unzip();

    Some(Series {
        labels,
        values,
        kind: request.kind,
        title: request.title().map(str::to_string),
    })
}

/// Read a display-formatted cell (`"$1,234.50"`, `"-12%"`) as a number.
///
/// Every character other than an ASCII digit, `.` or `-` is dropped, then the
/// longest leading decimal literal is parsed: `"1.2.3"` reads as `1.2`,
/// `"12-3"` as `12`. Returns `None` when no digits lead the cleaned text.
pub fn coerce_measure(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    parse_decimal_prefix(&cleaned)
}

fn parse_decimal_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut pos = 0;
    if bytes.first() == Some(&b'-') {
        pos = 1;
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let int_digits = pos - int_start;
    let mut end = pos;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        let mut frac_end = pos + 1;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        frac_digits = frac_end - pos - 1;
        if frac_digits > 0 {
            end = frac_end;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    s[..end].parse::<f64>().ok()
}
