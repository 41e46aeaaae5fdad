use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use catstat::cli::{AnalyzeArgs, Cli, Command, OutputFormat, ResultsAction, ResultsArgs};
use catstat::config::AnalysisConfig;
use catstat::csv_output::CsvFrequencyOutput;
use catstat::dataset;
use catstat::election::{ElectionRegistry, NewPollingUnitResult, PartyScore};
use catstat::json_output::JsonOutput;
use catstat::normalize::NormalizationRules;
use catstat::observations::GroupedObservations;
use catstat::sink::{publish, CsvStore, WriterSink};
use catstat::stats::CategoricalStatsEngine;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load observations from --input or the built-in sample
fn load_observations(args: &AnalyzeArgs) -> Result<GroupedObservations> {
    match (&args.input, args.sample) {
        (Some(path), false) => GroupedObservations::from_json_file(path),
        (None, true) => Ok(dataset::weekly_colors()),
        (Some(_), true) => bail!("Cannot specify both --input and --sample. Choose one."),
        (None, false) => {
            bail!("Must specify either --input FILE or --sample. Usage: catstat analyze --input FILE")
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let observations = load_observations(&args)?;

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::builtin()?,
    }
    .with_target(args.target.clone());

    let rules = if args.no_normalize {
        NormalizationRules::none()
    } else {
        config.normalization.clone()
    };
    tracing::info!(
        groups = observations.group_count(),
        observations = observations.total_observations(),
        rules = rules.len(),
        target_label = %config.target,
        "starting analysis"
    );

    let engine = CategoricalStatsEngine::new(rules);
    let report = engine.analyze(&observations, &config.target)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => report.write_summary(&mut out)?,
        OutputFormat::Json => {
            let json = JsonOutput::from_report(&report)
                .with_corrections(engine.rules().iter())
                .to_json()
                .context("Failed to serialize JSON report")?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Csv => write!(out, "{}", CsvFrequencyOutput::from_report(&report).to_csv())?,
    }

    match &args.store {
        Some(path) if path.as_os_str() == "-" => {
            writeln!(out)?;
            publish(&report.frequencies, &mut WriterSink::new(&mut out))?;
        }
        Some(path) => {
            let mut store = CsvStore::open(path)?;
            publish(&report.frequencies, &mut store)?;
            store.persist()?;
        }
        None => {}
    }

    Ok(())
}

fn print_scores(out: &mut impl Write, title: &str, header: &str, scores: &[PartyScore]) -> Result<()> {
    writeln!(out, "{}", title)?;
    if scores.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }
    writeln!(out, "{:<20} {:>10}", "party", header)?;
    writeln!(out, "-------------------- ----------")?;
    for entry in scores {
        writeln!(out, "{:<20} {:>10}", entry.party, entry.score)?;
    }
    Ok(())
}

fn run_results(args: ResultsArgs) -> Result<()> {
    let mut registry = ElectionRegistry::from_json_file(&args.data)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.action {
        ResultsAction::PollingUnit { id } => {
            let unit = registry.polling_unit(id)?;
            let title = format!("Results for polling unit {} ({})", unit.name, unit.id);
            let scores = registry.polling_unit_results(id)?;
            print_scores(&mut out, &title, "score", &scores)?;
        }
        ResultsAction::Lga { id } => {
            let lga = registry.lga(id)?;
            let title = format!("Results for {} LGA", lga.name);
            let totals = registry.lga_summed_results(id)?;
            print_scores(&mut out, &title, "total", &totals)?;

            let announced = registry.lga_announced_results(id)?;
            if !announced.is_empty() {
                writeln!(out)?;
                print_scores(&mut out, "Announced LGA totals", "announced", &announced)?;
                for entry in &announced {
                    let summed = totals
                        .iter()
                        .find(|t| t.party == entry.party)
                        .map_or(0, |t| t.score);
                    if summed != entry.score {
                        writeln!(
                            out,
                            "Mismatch: {} summed {} but announced {}",
                            entry.party, summed, entry.score
                        )?;
                    }
                }
            }
        }
        ResultsAction::Add { name, ward, scores } => {
            let id = registry.add_polling_unit_result(NewPollingUnitResult {
                name,
                ward_id: ward,
                scores,
            })?;
            registry.write_json_file(&args.data)?;
            writeln!(out, "Added polling unit {}", id)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(cli.debug);

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Results(args) => run_results(args),
    }
}
