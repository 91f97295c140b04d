use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use workflow::config::RunConfig;
use workflow::runner::{RunRequest, Runner};

mod discovery;
mod generator;
mod store;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Daily radar moment resampling driver")]
struct Args {
    /// Day to process (YYYY-MM-DD or YYYYMMDD)
    #[arg(long)]
    date: String,
    /// Root of the raw moment archive
    #[arg(long)]
    input_root: PathBuf,
    /// Directory receiving the resampled day file
    #[arg(long)]
    output_root: PathBuf,
    /// Instrument band identifier (x, ka, w)
    #[arg(long)]
    band: String,
    /// Load a run config from YAML instead of the built-in band table
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write a synthetic day of moment files under the input root first
    #[arg(long, default_value_t = false)]
    synthesize: bool,
}

fn parse_date(text: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y%m%d"))
        .with_context(|| format!("unparseable date {:?}", text))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let date = parse_date(&args.date)?;
    let config = if let Some(path) = args.config {
        RunConfig::load(path)?
    } else {
        RunConfig::default()
    };

    if args.synthesize {
        let descriptor = config.band(&args.band)?.to_descriptor(&args.band);
        let written = generator::synthesize_day(
            &args.input_root,
            date,
            &descriptor,
            &generator::SampleSpec::default(),
        )?;
        println!(
            "Synthesized {} moment files under {}",
            written.len(),
            args.input_root.display()
        );
    }

    let runner = Runner::new(config);
    let summary = runner.execute(&RunRequest {
        date,
        band: args.band,
        input_root: args.input_root,
        output_root: args.output_root,
    })?;

    println!(
        "Resampled day -> {} ({} files merged, {} skipped, {} x {} grid)",
        summary.output.display(),
        summary.merged_files,
        summary.skipped_files,
        summary.time_steps,
        summary.range_bins
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_in_both_accepted_layouts() {
        let expected = NaiveDate::from_ymd_opt(2019, 1, 22).unwrap();
        assert_eq!(parse_date("2019-01-22").unwrap(), expected);
        assert_eq!(parse_date("20190122").unwrap(), expected);
        assert!(parse_date("22.01.2019").is_err());
    }
}
