/// Sentinel used by the source data for a missing value
const NOT_AVAILABLE: &str = "NA";

/// One country row of the indicator dataset
///
/// Numeric indicators are `None` whenever the source cell was empty, held the
/// `NA` sentinel, or did not contain a finite number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub(crate) country: String,
    pub(crate) region: String,
    pub(crate) income_group: String,
    pub(crate) gdp_1993: Option<f64>,
    pub(crate) gdp_2019: Option<f64>,
    pub(crate) pop_2019: Option<f64>,
}

impl Record {
    /// The display name of the country
    pub fn country(&self) -> &str {
        &self.country
    }

    /// The region the country is grouped under
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The descriptive income group
    pub fn income_group(&self) -> &str {
        &self.income_group
    }

    /// Economic output in 1993
    pub fn gdp_1993(&self) -> Option<f64> {
        self.gdp_1993
    }

    /// Economic output in 2019
    pub fn gdp_2019(&self) -> Option<f64> {
        self.gdp_2019
    }

    /// Population in 2019
    pub fn pop_2019(&self) -> Option<f64> {
        self.pop_2019
    }

    /// The change in economic output between 1993 and 2019
    /// Only available if both years are known
    pub fn gdp_delta(&self) -> Option<f64> {
        Some(self.gdp_2019? - self.gdp_1993?)
    }
}

/// An ordered, read-only sequence of records
///
/// A dataset is produced once per load. Consumers derive new sequences from
/// it, the records themselves can't be changed after parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Creates a dataset from records in source order
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The records in source order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if the dataset holds no records at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Coerces a raw cell into a number
///
/// Empty cells and the `NA` sentinel are missing values. Everything else is
/// parsed after trimming surrounding whitespace, so a blank cell reads as
/// zero. Anything that isn't a finite number is treated as missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell == NOT_AVAILABLE {
        return None;
    }

    let cell = cell.trim();
    if cell.is_empty() {
        return Some(0.0);
    }

    cell.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
