use std::io::Write;

use crate::aggregate::{Kpis, RankedEntry};
use crate::table::{RegionFilter, TableRow};

/// Label shown instead of a missing value
pub const NOT_AVAILABLE: &str = "N/A";

/// Chart labels longer than this are cut off
const MAX_LABEL_CHARS: usize = 11;

/// Suffixes of the compact number notation, one per power of thousand
const UNITS: [&str; 5] = ["", "K", "M", "B", "T"];

/// The two ranking charts of the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chart {
    /// Countries ranked by 2019 output
    GdpByCountry,
    /// Regions ranked by summed 2019 population
    PopulationByRegion,
}

impl Chart {
    /// The heading shown above the chart
    pub fn title(&self) -> &'static str {
        match self {
            Self::GdpByCountry => "Top 10 GDP (2019)",
            Self::PopulationByRegion => "Population by region (2019)",
        }
    }

    /// Formats a value of the chart for display
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::GdpByCountry => format_currency(value),
            Self::PopulationByRegion => format_compact(value),
        }
    }
}

/// The presentation side of the dashboard
///
/// A view receives the plain outputs of the pipeline and decides how to show
/// them. Missing values are passed as `None`, the view picks its own marker.
pub trait DashboardView {
    type Error;

    /// Shows the key figures
    fn kpis(&mut self, kpis: &Kpis) -> Result<(), Self::Error>;

    /// Shows one of the ranking charts
    fn chart(&mut self, chart: Chart, entries: &[RankedEntry]) -> Result<(), Self::Error>;

    /// Shows the selectable regions
    /// *The `all` option is always available and not part of `regions`*
    fn region_options(
        &mut self,
        selected: &RegionFilter,
        regions: &[String],
    ) -> Result<(), Self::Error>;

    /// Shows the rows of the table
    fn table(&mut self, rows: &[TableRow<'_>]) -> Result<(), Self::Error>;
}

/// Formats a number in the compact en-US notation, e.g. `1.23K` or `7.7B`
///
/// At most two fraction digits are kept, trailing zeros are dropped.
pub fn format_compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}", compact_magnitude(value.abs()))
}

/// Formats an amount of US dollars in the compact notation, e.g. `$21.43T`
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}", compact_magnitude(value.abs()))
}

/// Formats an optional value, using [`NOT_AVAILABLE`] if it's missing
pub fn format_optional(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn compact_magnitude(value: f64) -> String {
    let round = |scaled: f64| (scaled * 100.0).round() / 100.0;

    let mut exponent = 0;
    while exponent + 1 < UNITS.len() && value >= 1000f64.powi(exponent as i32 + 1) {
        exponent += 1;
    }
    let mut scaled = round(value / 1000f64.powi(exponent as i32));
    // 999_999 rounds to 1000K, which reads as 1M
    if scaled >= 1000.0 && exponent + 1 < UNITS.len() {
        exponent += 1;
        scaled = round(value / 1000f64.powi(exponent as i32));
    }

    let digits = format!("{scaled:.2}");
    let digits = digits.trim_end_matches('0').trim_end_matches('.');
    format!("{digits}{}", UNITS[exponent])
}

/// Shortens long chart labels
pub fn chart_label(label: &str) -> String {
    match label.char_indices().nth(MAX_LABEL_CHARS) {
        Some((end, _)) => format!("{}...", &label[..end]),
        None => label.to_string(),
    }
}

/// The length of a bar relative to the largest value of its chart
///
/// The largest value is never taken to be smaller than one.
pub fn bar_length(value: f64, max: f64, width: usize) -> usize {
    let ratio = (value / max.max(1.0)).clamp(0.0, 1.0);
    (ratio * width as f64).round() as usize
}

/// A human readable view for terminals
#[derive(Debug)]
pub struct TextView<W> {
    writer: W,
    bar_width: usize,
}

impl<W: Write> TextView<W> {
    /// Creates a view writing to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bar_width: 40,
        }
    }

    /// Sets the number of characters used by the longest bar
    pub fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width;
        self
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DashboardView for TextView<W> {
    type Error = std::io::Error;

    fn kpis(&mut self, kpis: &Kpis) -> Result<(), Self::Error> {
        let figures = [
            ("Countries", format_compact(kpis.country_count as f64)),
            ("Population (2019)", format_compact(kpis.total_population)),
            ("Average GDP (2019)", format_currency(kpis.average_gdp_2019)),
            ("Grew since 1993", format_compact(kpis.growth_count as f64)),
        ];

        for (name, value) in figures {
            writeln!(self.writer, "{name:<20}{value}")?;
        }
        writeln!(self.writer)
    }

    fn chart(&mut self, chart: Chart, entries: &[RankedEntry]) -> Result<(), Self::Error> {
        let max = entries
            .iter()
            .map(|entry| entry.value)
            .fold(1.0, f64::max);
        let fill = match chart {
            Chart::GdpByCountry => "#",
            Chart::PopulationByRegion => "=",
        };

        writeln!(self.writer, "{}", chart.title())?;
        for entry in entries {
            let bar = fill.repeat(bar_length(entry.value, max, self.bar_width));
            writeln!(
                self.writer,
                "  {:<14} {:<width$} {}",
                chart_label(&entry.label),
                bar,
                chart.format(entry.value),
                width = self.bar_width,
            )?;
        }
        writeln!(self.writer)
    }

    fn region_options(
        &mut self,
        selected: &RegionFilter,
        regions: &[String],
    ) -> Result<(), Self::Error> {
        writeln!(self.writer, "Regions")?;
        let marker = |active: bool| if active { '*' } else { ' ' };

        writeln!(self.writer, "{} all", marker(*selected == RegionFilter::All))?;
        for region in regions {
            let active = matches!(selected, RegionFilter::Region(r) if r == region);
            writeln!(self.writer, "{} {region}", marker(active))?;
        }
        writeln!(self.writer)
    }

    fn table(&mut self, rows: &[TableRow<'_>]) -> Result<(), Self::Error> {
        writeln!(
            self.writer,
            "{:<32} {:<28} {:<22} {:>10} {:>10} {:>10}",
            "Country", "Region", "Income group", "GDP 2019", "Population", "Change",
        )?;
        for row in rows {
            let record = row.record();
            writeln!(
                self.writer,
                "{:<32} {:<28} {:<22} {:>10} {:>10} {:>10}",
                record.country(),
                record.region(),
                record.income_group(),
                format_optional(record.gdp_2019(), format_currency),
                format_optional(record.pop_2019(), format_compact),
                format_optional(row.delta(), format_currency),
            )?;
        }
        self.writer.flush()
    }
}

/// The header row of the CSV export
const CSV_HEADER: [&str; 6] = ["country", "region", "income_group", "gdp_2019", "pop_2019", "delta"];

/// Exports the table as CSV
///
/// Only the table rows are written, key figures and charts are skipped.
/// Every rendered table starts with its own header row, so repeated renders
/// can be told apart. Missing values are left empty.
#[derive(Debug)]
pub struct CsvView<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvView<W> {
    /// Creates a view writing to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|error| error.into_error().into())
    }
}

impl<W: Write> DashboardView for CsvView<W> {
    type Error = csv::Error;

    fn kpis(&mut self, _kpis: &Kpis) -> Result<(), Self::Error> {
        Ok(())
    }

    fn chart(&mut self, _chart: Chart, _entries: &[RankedEntry]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn region_options(
        &mut self,
        _selected: &RegionFilter,
        _regions: &[String],
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn table(&mut self, rows: &[TableRow<'_>]) -> Result<(), Self::Error> {
        self.writer.write_record(CSV_HEADER)?;
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;

        Ok(())
    }
}
