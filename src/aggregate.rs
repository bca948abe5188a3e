use std::cmp::Ordering;
use std::collections::HashMap;

use crate::record::Dataset;

/// The number of entries kept in a ranking
pub const TOP_N: usize = 10;

/// One labelled entry of a ranking
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
}

/// The key figures of a dataset
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Kpis {
    /// The number of countries in the dataset
    pub country_count: usize,
    /// The summed population, missing values count as zero
    pub total_population: f64,
    /// The mean 2019 output of all countries that report one
    pub average_gdp_2019: f64,
    /// The number of countries whose output strictly grew since 1993
    pub growth_count: usize,
}

impl Kpis {
    /// Computes the key figures of a dataset
    pub fn compute(dataset: &Dataset) -> Self {
        let records = dataset.records();

        let total_population = records
            .iter()
            .map(|record| record.pop_2019.unwrap_or(0.0))
            .sum::<f64>();
        let (gdp_sum, gdp_count) = records
            .iter()
            .filter_map(|record| record.gdp_2019)
            .fold((0.0, 0usize), |(sum, count), gdp| (sum + gdp, count + 1));
        let average_gdp_2019 = match gdp_count {
            0 => 0.0,
            count => gdp_sum / count as f64,
        };
        let growth_count = records
            .iter()
            .filter(|record| matches!(
                (record.gdp_1993, record.gdp_2019),
                (Some(before), Some(after)) if after > before
            ))
            .count();

        Self {
            country_count: records.len(),
            total_population,
            average_gdp_2019,
            growth_count,
        }
    }
}

/// Everything the dashboard derives from a freshly loaded dataset
///
/// The overview only depends on the dataset. It is not affected by the
/// region filter of the table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overview {
    pub kpis: Kpis,
    pub top_gdp_by_country: Vec<RankedEntry>,
    pub top_population_by_region: Vec<RankedEntry>,
}

impl Overview {
    /// Computes key figures and both rankings of a dataset
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            kpis: Kpis::compute(dataset),
            top_gdp_by_country: top_gdp_by_country(dataset),
            top_population_by_region: top_population_by_region(dataset),
        }
    }
}

/// The countries with the highest 2019 output
///
/// Countries without a 2019 value are left out. Equal values keep their
/// dataset order.
pub fn top_gdp_by_country(dataset: &Dataset) -> Vec<RankedEntry> {
    let entries = dataset
        .records()
        .iter()
        .filter_map(|record| {
            record.gdp_2019.map(|value| RankedEntry {
                label: record.country.clone(),
                value,
            })
        })
        .collect();

    top(entries)
}

/// The regions with the highest summed population
///
/// Regions are ranked in the order they first appear in the dataset before
/// sorting, so equal sums keep that order.
pub fn top_population_by_region(dataset: &Dataset) -> Vec<RankedEntry> {
    let mut groups = Vec::<RankedEntry>::new();
    let mut index = HashMap::<&str, usize>::new();

    for record in dataset.records() {
        let group = *index
            .entry(record.region.as_str())
            .or_insert_with(|| {
                groups.push(RankedEntry {
                    label: record.region.clone(),
                    value: 0.0,
                });
                groups.len() - 1
            });
        groups[group].value += record.pop_2019.unwrap_or(0.0);
    }

    top(groups)
}

/// Orders two values from high to low
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn top(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    // `sort_by` is stable, ties stay in their original order
    entries.sort_by(|a, b| descending(a.value, b.value));
    entries.truncate(TOP_N);
    entries
}
