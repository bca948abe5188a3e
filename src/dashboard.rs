use std::path::{Path, PathBuf};

use crate::aggregate::Overview;
use crate::parser::parse;
use crate::record::Dataset;
use crate::render::{Chart, DashboardView};
use crate::table::{distinct_regions, table_rows, RegionFilter, TableRow};

/// Possible errors to occur while loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read the dataset: {0}")]
    Read(#[from] std::io::Error),
}

/// Where the raw CSV text of a dataset comes from
pub trait Source {
    /// Reads the complete text of the dataset
    fn read(&self) -> std::io::Result<String>;
}

/// A dataset stored in a file
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn read(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

impl Source for String {
    fn read(&self) -> std::io::Result<String> {
        Ok(self.clone())
    }
}

impl Source for &str {
    fn read(&self) -> std::io::Result<String> {
        Ok(self.to_string())
    }
}

/// The dashboard state and the actions a user can trigger on it
///
/// The dashboard owns the current dataset and everything derived from it.
/// A reload replaces all of it at once. Changing the region filter only
/// affects the table, the overview stays the same.
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    dataset: Dataset,
    overview: Overview,
    /// Distinct regions of the dataset, in display order
    regions: Vec<String>,
    filter: RegionFilter,
}

impl<S: Source> Dashboard<S> {
    /// Creates a dashboard without any data
    /// *Nothing is read from the source until [`Dashboard::reload`] is called*
    pub fn new(source: S) -> Self {
        Self {
            source,
            dataset: Dataset::default(),
            overview: Overview::default(),
            regions: Vec::new(),
            filter: RegionFilter::All,
        }
    }

    /// Creates a dashboard and loads the dataset from the source
    pub fn load(source: S) -> Result<Self, LoadError> {
        let mut dashboard = Self::new(source);
        dashboard.reload()?;

        Ok(dashboard)
    }

    /// Reads the source again and replaces the current dataset
    ///
    /// The region filter is reset to [`RegionFilter::All`]. If the source
    /// can't be read, the dashboard keeps its current state.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let text = self.source.read()?;
        let dataset = parse(&text);

        self.overview = Overview::compute(&dataset);
        self.regions = distinct_regions(&dataset);
        self.dataset = dataset;
        self.filter = RegionFilter::All;

        tracing::info!(
            records = self.dataset.len(),
            regions = self.regions.len(),
            "loaded dataset"
        );

        Ok(())
    }

    /// Selects the region shown in the table
    ///
    /// A region that isn't part of the dataset is accepted, the table is just
    /// empty in that case.
    pub fn set_region_filter(&mut self, filter: RegionFilter) {
        if let RegionFilter::Region(region) = &filter {
            if !self.regions.contains(region) {
                tracing::warn!(region = %region, "region is not part of the dataset");
            }
        }
        self.filter = filter;
    }
}

impl<S> Dashboard<S> {
    /// The currently loaded dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Key figures and rankings of the current dataset
    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    /// The regions that can be selected, besides `all`
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// The current region filter
    pub fn filter(&self) -> &RegionFilter {
        &self.filter
    }

    /// The rows of the table for the current filter
    pub fn table(&self) -> Vec<TableRow<'_>> {
        table_rows(&self.dataset, &self.filter)
    }

    /// Renders the whole dashboard
    pub fn render<V: DashboardView>(&self, view: &mut V) -> Result<(), V::Error> {
        view.kpis(&self.overview.kpis)?;
        view.chart(Chart::GdpByCountry, &self.overview.top_gdp_by_country)?;
        view.chart(Chart::PopulationByRegion, &self.overview.top_population_by_region)?;
        view.region_options(&self.filter, &self.regions)?;
        self.render_table(view)
    }

    /// Renders only the table, e.g. after the filter changed
    pub fn render_table<V: DashboardView>(&self, view: &mut V) -> Result<(), V::Error> {
        view.table(&self.table())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::aggregate::{Kpis, RankedEntry};

    const UTOPIA: &str = "country,region,income_group,gdp_1993,gdp_2019,pop_2019\n\
                          Utopia,X,High income,100,200,1000\n\
                          Dystopia,X,Low income,NA,,500\n";

    /// Hands out prepared results, one per read
    struct Scripted(RefCell<VecDeque<std::io::Result<String>>>);

    impl Scripted {
        fn new(results: Vec<std::io::Result<String>>) -> Self {
            Self(RefCell::new(results.into()))
        }
    }

    impl Source for Scripted {
        fn read(&self) -> std::io::Result<String> {
            self.0
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(std::io::ErrorKind::UnexpectedEof.into()))
        }
    }

    #[test]
    fn utopia_and_dystopia() {
        let dashboard = Dashboard::load(UTOPIA).unwrap();

        assert_eq!(dashboard.overview().kpis, Kpis {
            country_count: 2,
            total_population: 1500.0,
            average_gdp_2019: 200.0,
            growth_count: 1,
        });
        assert_eq!(dashboard.overview().top_gdp_by_country, vec![RankedEntry {
            label: "Utopia".to_string(),
            value: 200.0,
        }]);
        assert_eq!(dashboard.regions(), ["X".to_string()]);

        let table = dashboard.table();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].record().country(), "Utopia");
        assert_eq!(table[0].delta(), Some(100.0));
        assert_eq!(table[1].record().country(), "Dystopia");
        assert_eq!(table[1].delta(), None);
    }

    #[test]
    fn new_dashboard_is_empty() {
        let dashboard = Dashboard::new(UTOPIA);

        assert!(dashboard.dataset().is_empty());
        assert!(dashboard.table().is_empty());
        assert_eq!(dashboard.overview(), &Overview::default());
    }

    #[test]
    fn filter_only_changes_the_table() {
        let text = "country,region,income_group,gdp_1993,gdp_2019,pop_2019\n\
                    A,North,,,10,1\n\
                    B,South,,,20,2\n";
        let mut dashboard = Dashboard::load(text).unwrap();
        let overview = dashboard.overview().clone();

        dashboard.set_region_filter(RegionFilter::from("North"));
        let table = dashboard.table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].record().country(), "A");
        assert_eq!(dashboard.overview(), &overview);

        dashboard.set_region_filter(RegionFilter::from("Nowhere"));
        assert!(dashboard.table().is_empty());
        assert_eq!(dashboard.filter(), &RegionFilter::from("Nowhere"));
    }

    #[test]
    fn reload_replaces_the_dataset_and_resets_the_filter() {
        let first = "country,region,income_group,gdp_1993,gdp_2019,pop_2019\nA,North,,,10,1";
        let second = "country,region,income_group,gdp_1993,gdp_2019,pop_2019\nB,South,,,20,2\nC,East,,,5,3";
        let mut dashboard = Dashboard::load(Scripted::new(vec![
            Ok(first.to_string()),
            Ok(second.to_string()),
        ])).unwrap();
        dashboard.set_region_filter(RegionFilter::from("North"));

        dashboard.reload().unwrap();

        assert_eq!(dashboard.filter(), &RegionFilter::All);
        assert_eq!(dashboard.dataset().len(), 2);
        assert_eq!(dashboard.regions(), ["East".to_string(), "South".to_string()]);
        assert_eq!(dashboard.overview().kpis.total_population, 5.0);
    }

    #[test]
    fn failed_reload_keeps_the_current_state() {
        let mut dashboard = Dashboard::load(Scripted::new(vec![
            Ok(UTOPIA.to_string()),
            Err(std::io::ErrorKind::NotFound.into()),
        ])).unwrap();
        dashboard.set_region_filter(RegionFilter::from("X"));
        let dataset = dashboard.dataset().clone();
        let overview = dashboard.overview().clone();

        assert!(matches!(dashboard.reload(), Err(LoadError::Read(_))));
        assert_eq!(dashboard.dataset(), &dataset);
        assert_eq!(dashboard.overview(), &overview);
        assert_eq!(dashboard.filter(), &RegionFilter::from("X"));
    }

    #[test]
    fn missing_file() {
        let source = FileSource::new("does/not/exist.csv");
        assert!(matches!(Dashboard::load(source), Err(LoadError::Read(_))));
    }

    /// Remembers which parts were rendered
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl DashboardView for Recorder {
        type Error = std::convert::Infallible;

        fn kpis(&mut self, kpis: &Kpis) -> Result<(), Self::Error> {
            self.calls.push(format!("kpis {}", kpis.country_count));
            Ok(())
        }

        fn chart(&mut self, chart: Chart, entries: &[RankedEntry]) -> Result<(), Self::Error> {
            self.calls.push(format!("{chart:?} {}", entries.len()));
            Ok(())
        }

        fn region_options(
            &mut self,
            selected: &RegionFilter,
            regions: &[String],
        ) -> Result<(), Self::Error> {
            self.calls.push(format!("regions {selected} {}", regions.len()));
            Ok(())
        }

        fn table(&mut self, rows: &[TableRow<'_>]) -> Result<(), Self::Error> {
            self.calls.push(format!("table {}", rows.len()));
            Ok(())
        }
    }

    #[test]
    fn render_passes_every_part_to_the_view() {
        let mut dashboard = Dashboard::load(UTOPIA).unwrap();
        let mut view = Recorder::default();
        dashboard.render(&mut view).unwrap();

        assert_eq!(view.calls, vec![
            "kpis 2",
            "GdpByCountry 1",
            "PopulationByRegion 1",
            "regions all 1",
            "table 2",
        ]);

        dashboard.set_region_filter(RegionFilter::from("Y"));
        let mut view = Recorder::default();
        dashboard.render_table(&mut view).unwrap();
        assert_eq!(view.calls, vec!["table 0"]);
    }
}
