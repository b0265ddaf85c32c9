//! Subcommands of the query tool.

use std::io::Write;

use alti_common::{HalfOrbit, Period, PolygonLike};
use alti_io::{AltimetryData, AltimetrySource, OrbitQuery, QueryOptions, QueryOutput};
use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List variables, optionally those matching a substring
    Variables {
        /// Case-insensitive substring of the name or description
        #[arg(long)]
        containing: Option<String>,
    },

    /// Print the temporal extent of the source
    Period,

    /// List half-orbits with their first and last measurement times
    HalfOrbits {
        /// Lowest half-orbit, as CYCLE:PASS (inclusive)
        #[arg(long)]
        min: Option<HalfOrbit>,

        /// Highest half-orbit, as CYCLE:PASS (inclusive)
        #[arg(long)]
        max: Option<HalfOrbit>,
    },

    /// Fetch records by time
    Query {
        /// Period as START/END in ISO 8601, repeatable
        #[arg(long = "period", required = true, value_parser = Period::parse)]
        periods: Vec<Period>,

        #[command(flatten)]
        selection: Selection,
    },

    /// Fetch records by cycle and pass
    Orbit {
        /// Cycle number, repeatable
        #[arg(long = "cycle", required = true)]
        cycles: Vec<u32>,

        /// Pass number, repeatable (default: every pass)
        #[arg(long = "pass")]
        passes: Vec<u32>,

        #[command(flatten)]
        selection: Selection,
    },
}

/// Options shared by the fetching subcommands.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct Selection {
    /// Variable to return, repeatable (coordinates are always returned)
    #[arg(long = "variable")]
    variables: Vec<String>,

    /// WKT polygon restricting the records
    #[arg(long, value_parser = PolygonLike::from_wkt)]
    polygon: Option<PolygonLike>,

    /// Print one dataset per period or orbit group instead of a merged one
    #[arg(long)]
    split: bool,
}

impl Selection {
    fn options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        if !self.variables.is_empty() {
            options = options.with_variables(self.variables.iter().cloned());
        }
        if let Some(polygon) = &self.polygon {
            options = options.within(polygon.clone());
        }
        options
    }
}

/// Run a command against a source, writing JSON to `out`.
pub fn run<S: AltimetrySource>(
    data: &AltimetryData<S>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Variables { containing } => {
            let table = data.show_variables(containing.as_deref())?;
            info!(count = table.len(), "Listed variables");
            print_json(out, &table.iter().collect::<Vec<_>>())
        }
        Command::Period => print_json(out, &data.period()?),
        Command::HalfOrbits { min, max } => print_json(out, &data.half_orbit_periods(min, max)?),
        Command::Query { periods, selection } => {
            let output = data.query(periods, &selection.options(), !selection.split)?;
            print_output(out, output)
        }
        Command::Orbit {
            cycles,
            passes,
            selection,
        } => {
            let mut query = OrbitQuery::cycles(cycles).with_options(selection.options());
            if !passes.is_empty() {
                query = query.passes(passes);
            }
            if selection.split {
                query = query.split();
            }
            print_output(out, data.query_orbit(&query)?)
        }
    }
}

fn print_output(out: &mut impl Write, output: QueryOutput) -> Result<()> {
    match output {
        QueryOutput::Merged(dataset) => {
            info!(records = dataset.len(), "Query complete");
            print_json(out, &dataset)
        }
        QueryOutput::Split(parts) => {
            info!(parts = parts.len(), "Query complete");
            print_json(out, &parts)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
