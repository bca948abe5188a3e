use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::aggregate::descending;
use crate::record::{Dataset, Record};

/// The maximum number of rows shown in the table
pub const TABLE_LIMIT: usize = 40;

/// The user facing value that selects every region
const ALL: &str = "all";

/// The region selection of the table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RegionFilter {
    /// Every record is shown
    #[default]
    All,
    /// Only records of exactly this region are shown
    Region(String),
}

impl RegionFilter {
    /// Checks if a record passes the filter
    ///
    /// Regions are compared exactly, including their case.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Region(region) => record.region() == region,
        }
    }
}

impl FromStr for RegionFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for RegionFilter {
    fn from(s: &str) -> Self {
        match s {
            ALL => Self::All,
            region => Self::Region(region.to_string()),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Region(region) => f.write_str(region),
        }
    }
}

/// A row of the table view
///
/// Besides the record itself, a row carries the change in output between
/// 1993 and 2019, which is only computed for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableRow<'a> {
    record: &'a Record,
    delta: Option<f64>,
}

impl<'a> TableRow<'a> {
    fn new(record: &'a Record) -> Self {
        Self {
            record,
            delta: record.gdp_delta(),
        }
    }

    /// The record shown in this row
    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// The change in output between 1993 and 2019
    pub fn delta(&self) -> Option<f64> {
        self.delta
    }
}

impl serde::Serialize for TableRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeStruct;
        let mut map = serializer.serialize_struct("TableRow", 6)?;

        map.serialize_field("country", self.record.country())?;
        map.serialize_field("region", self.record.region())?;
        map.serialize_field("income_group", self.record.income_group())?;
        map.serialize_field("gdp_2019", &self.record.gdp_2019())?;
        map.serialize_field("pop_2019", &self.record.pop_2019())?;
        map.serialize_field("delta", &self.delta)?;

        map.end()
    }
}

/// Produces the rows of the table view
///
/// Rows are filtered by region, sorted by their 2019 output from high to low
/// and cut off after [`TABLE_LIMIT`] rows. Missing output sorts like zero.
pub fn table_rows<'a>(dataset: &'a Dataset, filter: &RegionFilter) -> Vec<TableRow<'a>> {
    let mut rows = dataset
        .records()
        .iter()
        .filter(|record| filter.matches(record))
        .map(TableRow::new)
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| descending(
        a.record.gdp_2019().unwrap_or(0.0),
        b.record.gdp_2019().unwrap_or(0.0),
    ));
    rows.truncate(TABLE_LIMIT);

    rows
}

/// The distinct regions of a dataset in alphabetical order
///
/// The [`RegionFilter::All`] option is not part of the result.
pub fn distinct_regions(dataset: &Dataset) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut regions = dataset
        .records()
        .iter()
        .map(Record::region)
        .filter(|region| seen.insert(*region))
        .map(str::to_string)
        .collect::<Vec<_>>();

    regions.sort_by(|a, b| compare_names(a, b));
    regions
}

/// Compares two names the way a reader would expect them in a list
///
/// Accents and case are ignored first, so `Éire` sorts next to `Eire`.
/// Names that only differ in accents put the unaccented spelling first,
/// names that only differ in case put the lowercase spelling first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let base = |s: &str| {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    let accented = |s: &str| s.nfd().flat_map(char::to_lowercase).collect::<String>();

    base(a)
        .cmp(&base(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(x, y)| x != y)
                .map(|(x, y)| x.is_uppercase().cmp(&y.is_uppercase()))
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(b))
}
