pub use self::{
    aggregate::{top_gdp_by_country, top_population_by_region, Kpis, Overview, RankedEntry, TOP_N},
    dashboard::{Dashboard, FileSource, LoadError, Source},
    parser::{parse, split_line},
    record::{parse_number, Dataset, Record},
    render::{
        bar_length, chart_label, format_compact, format_currency, format_optional, Chart,
        CsvView, DashboardView, TextView, NOT_AVAILABLE,
    },
    table::{compare_names, distinct_regions, table_rows, RegionFilter, TableRow, TABLE_LIMIT},
};

mod aggregate;
mod dashboard;
mod parser;
mod record;
mod render;
mod table;
