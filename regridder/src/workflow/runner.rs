use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use fusecore::prelude::{MomentWriter, VariableEncoding};
use fusecore::resample::grid::ReferenceGrid;
use fusecore::resample::pipeline::{remove_stale_output, DatasetResampler};

use crate::discovery;
use crate::store::reader::JsonMomentReader;
use crate::store::writer::JsonMomentWriter;
use crate::workflow::config::RunConfig;

/// One unit of work: a date and a band against an input/output root pair.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub date: NaiveDate,
    pub band: String,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    pub merged_files: usize,
    pub skipped_files: usize,
    pub time_steps: usize,
    pub range_bins: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, request: &RunRequest) -> anyhow::Result<RunSummary> {
        let descriptor = self
            .config
            .band(&request.band)?
            .to_descriptor(&request.band);

        let time_grid = day_time_grid(request.date, self.config.time_step)?;
        let range_grid = ReferenceGrid::build(
            self.config.range_start,
            self.config.range_end,
            self.config.range_step,
        )
        .context("building range reference grid")?;
        let time_steps = time_grid.len();
        let range_bins = range_grid.len();

        let files = discovery::moment_files(&request.input_root, request.date, &descriptor.file_ext)?;
        log::info!(
            "{}: {} candidate {}-band files",
            request.date,
            files.len(),
            request.band
        );
        let reader =
            JsonMomentReader::new(&descriptor.epoch).context("constructing moment reader")?;
        let resampler = DatasetResampler::new(descriptor, time_grid, range_grid);

        let (dataset, report) = resampler.run(&files, &reader).with_context(|| {
            format!(
                "resampling {}-band moments for {}",
                request.band, request.date
            )
        })?;

        let writer = JsonMomentWriter;
        let output = output_path(
            &request.output_root,
            request.date,
            &request.band,
            writer.extension(),
        );
        fs::create_dir_all(&request.output_root).with_context(|| {
            format!("creating output root {}", request.output_root.display())
        })?;
        remove_stale_output(&output)?;

        let encodings: BTreeMap<String, VariableEncoding> = resampler
            .band()
            .variables
            .iter()
            .map(|name| (name.clone(), VariableEncoding::default()))
            .collect();
        writer
            .write(&output, &dataset, &encodings)
            .with_context(|| format!("writing resampled day {}", output.display()))?;

        Ok(RunSummary {
            output,
            merged_files: report.merged_files,
            skipped_files: report.skipped.len(),
            time_steps,
            range_bins,
        })
    }
}

/// Time reference grid of one day: midnight through 23:59:59 inclusive.
pub fn day_time_grid(date: NaiveDate, step: f64) -> anyhow::Result<ReferenceGrid> {
    let start = date
        .and_hms_opt(0, 0, 0)
        .context("building day start instant")?
        .and_utc()
        .timestamp() as f64;
    let grid =
        ReferenceGrid::build(start, start + 86_399.0, step).context("building time reference grid")?;
    Ok(grid)
}

pub fn output_path(root: &Path, date: NaiveDate, band: &str, ext: &str) -> PathBuf {
    root.join(format!("{}_mom_{}-band.{}", date.format("%Y%m%d"), band, ext))
}
