use crate::record::{parse_number, Dataset, Record};

/// The header names of the columns the dataset is built from
const COUNTRY: &str = "country";
const REGION: &str = "region";
const INCOME_GROUP: &str = "income_group";
const GDP_1993: &str = "gdp_1993";
const GDP_2019: &str = "gdp_2019";
const POP_2019: &str = "pop_2019";

/// Positions of the known columns inside a data line
#[derive(Debug, Default)]
struct Columns {
    country: Option<usize>,
    region: Option<usize>,
    income_group: Option<usize>,
    gdp_1993: Option<usize>,
    gdp_2019: Option<usize>,
    pop_2019: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Self {
        let names = header
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>();
        // later columns shadow earlier ones with the same name
        let position = |name: &str| names.iter().rposition(|column| *column == name);

        Self {
            country: position(COUNTRY),
            region: position(REGION),
            income_group: position(INCOME_GROUP),
            gdp_1993: position(GDP_1993),
            gdp_2019: position(GDP_2019),
            pop_2019: position(POP_2019),
        }
    }

    fn record(&self, fields: &[String]) -> Record {
        let text = |column: Option<usize>| {
            column
                .and_then(|index| fields.get(index))
                .cloned()
                .unwrap_or_default()
        };
        let number = |column: Option<usize>| {
            column
                .and_then(|index| fields.get(index))
                .and_then(|cell| parse_number(cell))
        };

        Record {
            country: text(self.country),
            region: text(self.region),
            income_group: text(self.income_group),
            gdp_1993: number(self.gdp_1993),
            gdp_2019: number(self.gdp_2019),
            pop_2019: number(self.pop_2019),
        }
    }
}

/// Parses the raw CSV text into a dataset
///
/// The first line names the columns, every following non-empty line becomes
/// one record. Parsing never fails: cells that are missing or can't be
/// coerced end up as empty strings or missing numbers.
pub fn parse(text: &str) -> Dataset {
    let mut lines = text
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    let columns = match lines.next() {
        Some(header) => Columns::from_header(header),
        None => return Dataset::default(),
    };

    let dataset = lines
        .filter(|line| !line.is_empty())
        .map(|line| columns.record(&split_line(line)))
        .collect::<Dataset>();

    let missing = dataset
        .records()
        .iter()
        .flat_map(|record| [record.gdp_1993, record.gdp_2019, record.pop_2019])
        .filter(Option::is_none)
        .count();
    tracing::debug!(records = dataset.len(), missing, "parsed dataset");

    dataset
}

/// Splits a single line into its fields
///
/// A double quote toggles quoted mode and is dropped, a comma outside of
/// quoted mode ends the current field. There's no escaping of quotes.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    fields
}
