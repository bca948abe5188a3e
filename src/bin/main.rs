use std::io::BufRead;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wdi_dashboard::{CsvView, Dashboard, DashboardView, FileSource, RegionFilter, Source, TextView};

const USAGE: &str = "commands: reload | region <name|all> | regions | quit";

/// The output formats of the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ArgEnum)]
enum Format {
    /// Key figures, charts and the table for terminals
    Text,
    /// The table as CSV
    Csv,
}

/// A cli dashboard for per-country economic indicators
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the indicator CSV file
    filename: std::path::PathBuf,
    /// The region shown in the table, `all` shows every region
    #[clap(short, long, default_value = "all", parse(from_str))]
    region: RegionFilter,
    /// How the dashboard is written to stdout
    #[clap(short, long, arg_enum, default_value = "text")]
    format: Format,
    /// Keep reading commands from stdin after the first render
    #[clap(short, long)]
    interactive: bool,
}

/// Actions that can be triggered in interactive mode
#[derive(Debug, PartialEq)]
enum Command {
    Reload,
    Region(RegionFilter),
    Regions,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "reload" => Some(Self::Reload),
            "regions" => Some(Self::Regions),
            "quit" | "exit" => Some(Self::Quit),
            _ => line
                .strip_prefix("region ")
                .map(|region| Self::Region(RegionFilter::from(region.trim()))),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // logs go to stderr, stdout is reserved for the dashboard itself
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let mut dashboard = Dashboard::load(FileSource::new(&args.filename))
        .with_context(|| format!("Failed to load {}", args.filename.display()))?;
    dashboard.set_region_filter(args.region);

    match args.format {
        Format::Text => show(&mut dashboard, &mut TextView::new(std::io::stdout()), args.interactive),
        Format::Csv => show(&mut dashboard, &mut CsvView::new(std::io::stdout()), args.interactive),
    }
}

fn show<S, V>(dashboard: &mut Dashboard<S>, view: &mut V, interactive: bool) -> anyhow::Result<()>
    where S: Source,
          V: DashboardView,
          V::Error: std::error::Error + Send + Sync + 'static,
{
    dashboard.render(view)?;
    if interactive {
        run(dashboard, view, std::io::stdin().lock())?;
    }

    Ok(())
}

/// Reacts to commands read line by line until `quit` or the end of input
fn run<S, V>(dashboard: &mut Dashboard<S>, view: &mut V, input: impl BufRead) -> anyhow::Result<()>
    where S: Source,
          V: DashboardView,
          V::Error: std::error::Error + Send + Sync + 'static,
{
    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Some(Command::Reload) => match dashboard.reload() {
                Ok(()) => dashboard.render(view)?,
                // the dashboard keeps showing the previous dataset
                Err(error) => {
                    tracing::error!(%error, "reload failed");
                }
            },
            Some(Command::Region(filter)) => {
                dashboard.set_region_filter(filter);
                dashboard.render_table(view)?;
            }
            Some(Command::Regions) => view.region_options(dashboard.filter(), dashboard.regions())?,
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => eprintln!("{USAGE}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands() {
        assert_eq!(Command::parse("reload"), Some(Command::Reload));
        assert_eq!(Command::parse("  regions "), Some(Command::Regions));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("region all"), Some(Command::Region(RegionFilter::All)));
        assert_eq!(
            Command::parse("region Latin America & Caribbean"),
            Some(Command::Region(RegionFilter::from("Latin America & Caribbean"))),
        );
        assert_eq!(Command::parse("region"), None);
        assert_eq!(Command::parse("help"), None);
    }

    /// Serves the dataset once, then fails every read
    struct Once(std::cell::Cell<bool>);

    impl Source for Once {
        fn read(&self) -> std::io::Result<String> {
            match self.0.replace(true) {
                false => Ok("country,region,income_group,gdp_1993,gdp_2019,pop_2019\n\
                             A,North,,,10,1\n\
                             B,South,,,20,2"
                    .to_string()),
                true => Err(std::io::ErrorKind::NotFound.into()),
            }
        }
    }

    #[test]
    fn failed_reload_keeps_the_dashboard() {
        let mut dashboard = Dashboard::load(Once(Default::default())).unwrap();
        let mut view = CsvView::new(Vec::<u8>::new());
        let input = "region North\nreload\n\nhelp\nquit\nregion South\n";

        run(&mut dashboard, &mut view, input.as_bytes()).unwrap();

        assert_eq!(dashboard.filter(), &RegionFilter::from("North"));
        assert_eq!(dashboard.dataset().len(), 2);
        let output = String::from_utf8(view.into_inner().unwrap()).unwrap();
        assert_eq!(output, "country,region,income_group,gdp_2019,pop_2019,delta\nA,North,,10.0,1.0,\n");
    }

    #[test]
    fn arguments() {
        let args = Args::try_parse_from(["wdi-dashboard", "data.csv"]).unwrap();
        assert_eq!(args.region, RegionFilter::All);
        assert_eq!(args.format, Format::Text);
        assert!(!args.interactive);

        let args = Args::try_parse_from([
            "wdi-dashboard", "data.csv", "--region", "South Asia", "--format", "csv", "-i",
        ]).unwrap();
        assert_eq!(args.region, RegionFilter::from("South Asia"));
        assert_eq!(args.format, Format::Csv);
        assert!(args.interactive);
    }
}
