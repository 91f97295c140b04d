use std::path::{Path, PathBuf};

use ndarray::{concatenate, Axis};

use crate::math::units::{UnitConverter, DECIBEL_UNITS};
use crate::moments::band::BandDescriptor;
use crate::moments::dataset::{Dataset, Variable};
use crate::moments::raw::RawMoments;
use crate::prelude::{MomentReader, ResampleError, ResampleResult};
use crate::resample::axis::AxisResampler;
use crate::resample::delta::DeltaComputer;
use crate::resample::grid::ReferenceGrid;
use crate::resample::nearest::NearestIndexResolver;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MergeMetrics;

/// One input file the merge step gave up on, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of merging a day of instrument files.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub merged_files: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Runs the per-instrument pipeline: merge the day's files, deduplicate
/// timestamps, correct the mounting-height offset, resample both axes onto
/// the reference grids, and convert reflectivity-like variables to dB.
/// Every step yields a new dataset value.
pub struct DatasetResampler {
    band: BandDescriptor,
    time_grid: ReferenceGrid,
    range_grid: ReferenceGrid,
    logger: LogManager,
}

impl DatasetResampler {
    pub fn new(band: BandDescriptor, time_grid: ReferenceGrid, range_grid: ReferenceGrid) -> Self {
        Self {
            band,
            time_grid,
            range_grid,
            logger: LogManager::new(),
        }
    }

    pub fn band(&self) -> &BandDescriptor {
        &self.band
    }

    /// Merges the descriptor's variable set out of every readable file.
    ///
    /// A file that fails to read, lacks a configured variable, or carries
    /// mis-shaped arrays is skipped with a diagnostic; the merge only aborts
    /// on an empty file list or when the surviving chunks disagree on the
    /// range coordinate.
    pub fn merge(
        &self,
        files: &[PathBuf],
        reader: &dyn MomentReader,
    ) -> ResampleResult<(Dataset, MergeReport)> {
        if files.is_empty() {
            return Err(ResampleError::NoInputData(format!(
                "{}-band",
                self.band.label
            )));
        }

        let metrics = MergeMetrics::new();
        let mut skipped = Vec::new();
        let mut merged: Option<Dataset> = None;

        for path in files {
            let chunk = match reader.read(path) {
                Ok(raw) => self.extract(&raw),
                Err(error) => Err(error.to_string()),
            };

            match chunk {
                Ok(chunk) => {
                    merged = Some(match merged.take() {
                        Some(accumulated) => Self::append(accumulated, chunk)?,
                        None => chunk,
                    });
                    metrics.record_merged();
                }
                Err(reason) => {
                    self.logger.warn_skipped(path, &reason);
                    metrics.record_skipped();
                    skipped.push(SkippedFile {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }

        let dataset = merged.ok_or_else(|| {
            ResampleError::Structural(format!(
                "none of the {} files contributed data",
                files.len()
            ))
        })?;

        let (merged_files, _) = metrics.snapshot();
        Ok((
            dataset,
            MergeReport {
                merged_files,
                skipped,
            },
        ))
    }

    /// Pulls the descriptor's variables out of one file, resolving aliases
    /// to canonical names. Errors here are per-file and recoverable.
    fn extract(&self, raw: &RawMoments) -> Result<Dataset, String> {
        let mut chunk = Dataset::new(raw.time.clone(), raw.range.clone());

        for name in &self.band.variables {
            let source = self.band.source_name(name);
            let variable = raw
                .variables
                .get(source)
                .ok_or_else(|| format!("variable {} not present", source))?;

            let expected = (raw.time.len(), raw.range.len());
            let actual = (variable.values.nrows(), variable.values.ncols());
            if actual != expected {
                return Err(format!(
                    "variable {} shaped {:?}, coordinates demand {:?}",
                    source, actual, expected
                ));
            }

            chunk.variables.insert(
                name.clone(),
                Variable {
                    values: variable.values.clone(),
                    units: variable.units.clone(),
                },
            );
        }

        Ok(chunk)
    }

    /// Appends `chunk` along the time axis. The chunks of one day must agree
    /// on the range coordinate; a clash is malformed upstream data.
    fn append(accumulated: Dataset, chunk: Dataset) -> ResampleResult<Dataset> {
        if accumulated.range != chunk.range {
            return Err(ResampleError::Structural(format!(
                "range coordinate clash between files ({} vs {} bins)",
                accumulated.range.len(),
                chunk.range.len()
            )));
        }

        let time = concatenate(Axis(0), &[accumulated.time.view(), chunk.time.view()])
            .map_err(|error| ResampleError::Structural(error.to_string()))?;

        let mut merged = Dataset::new(time, accumulated.range.clone());
        for (name, variable) in &accumulated.variables {
            let appended = chunk.variables.get(name).ok_or_else(|| {
                ResampleError::Structural(format!("variable {} vanished between files", name))
            })?;
            let values = concatenate(
                Axis(0),
                &[variable.values.view(), appended.values.view()],
            )
            .map_err(|error| ResampleError::Structural(error.to_string()))?;
            merged.variables.insert(
                name.clone(),
                Variable {
                    values,
                    units: variable.units.clone().or_else(|| appended.units.clone()),
                },
            );
        }

        Ok(merged)
    }

    /// Stable-sorts by time and keeps the first sample of every timestamp.
    pub fn deduplicate(&self, dataset: &Dataset) -> Dataset {
        let mut order: Vec<usize> = (0..dataset.time.len()).collect();
        order.sort_by(|&a, &b| dataset.time[a].total_cmp(&dataset.time[b]));

        let mut keep = Vec::with_capacity(order.len());
        let mut last: Option<f64> = None;
        for index in order {
            let instant = dataset.time[index];
            if last != Some(instant) {
                keep.push(index);
                last = Some(instant);
            }
        }

        let mut deduplicated = Dataset::new(
            dataset.time.select(Axis(0), &keep),
            dataset.range.clone(),
        );
        for (name, variable) in &dataset.variables {
            deduplicated.variables.insert(
                name.clone(),
                Variable {
                    values: variable.values.select(Axis(0), &keep),
                    units: variable.units.clone(),
                },
            );
        }
        deduplicated
    }

    /// Shifts the range coordinate by the instrument's mounting-height
    /// offset. Must run before the range-axis resample.
    pub fn apply_range_offset(&self, dataset: &Dataset) -> Dataset {
        let offset = self.band.range_offset;
        let mut shifted = Dataset::new(
            dataset.time.clone(),
            dataset.range.mapv(|position| position + offset),
        );
        shifted.variables = dataset.variables.clone();
        shifted
    }

    /// Two-pass separable nearest-neighbor resample: time axis first, range
    /// axis second. The per-axis pass is an accepted approximation of the
    /// joint 2-D nearest neighbor.
    pub fn resample(&self, dataset: &Dataset) -> ResampleResult<Dataset> {
        dataset.ensure_complete(&self.band.variables)?;

        let time_delta = DeltaComputer::compute(self.time_grid.positions(), dataset.time.view());
        let time_map = NearestIndexResolver::resolve(time_delta.view(), self.band.time_tolerance);

        let range_delta = DeltaComputer::compute(self.range_grid.positions(), dataset.range.view());
        let range_map =
            NearestIndexResolver::resolve(range_delta.view(), self.band.range_tolerance);

        self.logger.record(&format!(
            "{}-band matched {}/{} time steps and {}/{} range bins",
            self.band.label,
            time_map.matched_count(),
            time_map.len(),
            range_map.matched_count(),
            range_map.len()
        ));

        let mut resampled = Dataset::new(
            self.time_grid.positions().to_owned(),
            self.range_grid.positions().to_owned(),
        );
        for (name, variable) in &dataset.variables {
            let along_time = AxisResampler::remap_axis(variable.values.view(), &time_map, Axis(0));
            let values = AxisResampler::remap_axis(along_time.view(), &range_map, Axis(1));
            resampled.variables.insert(
                name.clone(),
                Variable {
                    values,
                    units: variable.units.clone(),
                },
            );
        }
        Ok(resampled)
    }

    /// Converts the descriptor's reflectivity-like variables to dB. Runs
    /// after resampling so unmatched positions stay NaN.
    pub fn convert_units(&self, dataset: &Dataset) -> Dataset {
        let mut converted = Dataset::new(dataset.time.clone(), dataset.range.clone());
        for (name, variable) in &dataset.variables {
            let variable = if self.band.converts_to_db(name) {
                Variable {
                    values: variable.values.mapv(UnitConverter::db_from_linear),
                    units: Some(DECIBEL_UNITS.to_string()),
                }
            } else {
                variable.clone()
            };
            converted.variables.insert(name.clone(), variable);
        }
        converted
    }

    /// The whole per-instrument pipeline in order.
    pub fn run(
        &self,
        files: &[PathBuf],
        reader: &dyn MomentReader,
    ) -> ResampleResult<(Dataset, MergeReport)> {
        let (merged, report) = self.merge(files, reader)?;
        let deduplicated = self.deduplicate(&merged);
        let shifted = self.apply_range_offset(&deduplicated);
        let resampled = self.resample(&shifted)?;
        let converted = self.convert_units(&resampled);
        Ok((converted, report))
    }
}

/// Deletes a pre-existing output file before the writer runs, so a rerun
/// never accretes state from a partial previous write.
pub fn remove_stale_output(path: &Path) -> ResampleResult<()> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|error| ResampleError::FileRead {
            path: path.to_path_buf(),
            reason: format!("removing stale output: {}", error),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};
    use std::collections::BTreeMap;

    fn descriptor() -> BandDescriptor {
        BandDescriptor {
            label: "Ka".to_string(),
            variables: vec!["Zg".to_string()],
            log_convert: vec![],
            range_offset: 0.0,
            time_tolerance: 2.0,
            range_tolerance: 18.0,
            epoch: "1970-01-01 00:00:00 UTC".to_string(),
            file_ext: "znc".to_string(),
            aliases: BTreeMap::new(),
        }
    }

    fn resampler(band: BandDescriptor, time_end: f64, range_end: f64) -> DatasetResampler {
        DatasetResampler::new(
            band,
            ReferenceGrid::build(0.0, time_end, 4.0).unwrap(),
            ReferenceGrid::build(0.0, range_end, 36.0).unwrap(),
        )
    }

    fn raw(time: Array1<f64>, range: Array1<f64>, values: Array2<f64>) -> RawMoments {
        let mut moments = RawMoments::new(time, range);
        moments.insert("Zg", values, Some("mm6 m-3".to_string()));
        moments
    }

    struct StubReader {
        files: BTreeMap<PathBuf, Option<RawMoments>>,
    }

    impl MomentReader for StubReader {
        fn read(&self, path: &Path) -> ResampleResult<RawMoments> {
            match self.files.get(path) {
                Some(Some(moments)) => Ok(moments.clone()),
                _ => Err(ResampleError::FileRead {
                    path: path.to_path_buf(),
                    reason: "unreadable".to_string(),
                }),
            }
        }
    }

    #[test]
    fn merge_rejects_empty_file_list() {
        let resampler = resampler(descriptor(), 8.0, 0.0);
        let reader = StubReader {
            files: BTreeMap::new(),
        };
        let err = resampler.merge(&[], &reader).unwrap_err();
        assert!(matches!(err, ResampleError::NoInputData(_)));
    }

    #[test]
    fn merge_tolerates_one_bad_file() {
        let good_a = PathBuf::from("a.znc");
        let bad = PathBuf::from("b.znc");
        let good_c = PathBuf::from("c.znc");

        let mut files = BTreeMap::new();
        files.insert(
            good_a.clone(),
            Some(raw(array![0.0], array![0.0], array![[1.0]])),
        );
        files.insert(bad.clone(), None);
        files.insert(
            good_c.clone(),
            Some(raw(array![4.0], array![0.0], array![[2.0]])),
        );
        let reader = StubReader { files };

        let resampler = resampler(descriptor(), 8.0, 0.0);
        let (dataset, report) = resampler
            .merge(&[good_a, bad.clone(), good_c], &reader)
            .unwrap();

        assert_eq!(dataset.time.to_vec(), vec![0.0, 4.0]);
        assert_eq!(report.merged_files, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, bad);
    }

    #[test]
    fn merge_skips_file_missing_a_configured_variable() {
        let good = PathBuf::from("a.znc");
        let incomplete = PathBuf::from("b.znc");

        let mut files = BTreeMap::new();
        files.insert(
            good.clone(),
            Some(raw(array![0.0], array![0.0], array![[1.0]])),
        );
        files.insert(
            incomplete.clone(),
            Some(RawMoments::new(array![4.0], array![0.0])),
        );
        let reader = StubReader { files };

        let resampler = resampler(descriptor(), 8.0, 0.0);
        let (dataset, report) = resampler.merge(&[good, incomplete], &reader).unwrap();

        assert_eq!(dataset.sample_count(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Zg"));
    }

    #[test]
    fn merge_fails_structurally_on_range_clash() {
        let first = PathBuf::from("a.znc");
        let second = PathBuf::from("b.znc");

        let mut files = BTreeMap::new();
        files.insert(
            first.clone(),
            Some(raw(array![0.0], array![0.0], array![[1.0]])),
        );
        files.insert(
            second.clone(),
            Some(raw(array![4.0], array![0.0, 36.0], array![[2.0, 3.0]])),
        );
        let reader = StubReader { files };

        let resampler = resampler(descriptor(), 8.0, 0.0);
        let err = resampler.merge(&[first, second], &reader).unwrap_err();
        assert!(matches!(err, ResampleError::Structural(_)));
    }

    #[test]
    fn merge_resolves_aliases_to_canonical_names() {
        let mut band = descriptor();
        band.aliases
            .insert("ze".to_string(), "Zg".to_string());
        let path = PathBuf::from("w.nc");

        let mut moments = RawMoments::new(array![0.0], array![0.0]);
        moments.insert("ze", array![[5.0]], None);
        let mut files = BTreeMap::new();
        files.insert(path.clone(), Some(moments));
        let reader = StubReader { files };

        let resampler = resampler(band, 8.0, 0.0);
        let (dataset, _) = resampler.merge(&[path], &reader).unwrap();
        assert!(dataset.variable("Zg").is_some());
    }

    #[test]
    fn deduplicate_keeps_first_occurrence_after_stable_sort() {
        let mut dataset = Dataset::new(array![0.0, 4.0, 0.0], array![0.0]);
        dataset.variables.insert(
            "Zg".to_string(),
            Variable {
                values: array![[1.0], [2.0], [3.0]],
                units: None,
            },
        );

        let resampler = resampler(descriptor(), 8.0, 0.0);
        let deduplicated = resampler.deduplicate(&dataset);

        assert_eq!(deduplicated.time.to_vec(), vec![0.0, 4.0]);
        let zg = deduplicated.variable("Zg").unwrap();
        // The value tied to the first occurrence of 0.0 survives.
        assert_eq!(zg.values[[0, 0]], 1.0);
        assert_eq!(zg.values[[1, 0]], 2.0);
    }

    #[test]
    fn range_offset_shifts_which_bin_matches() {
        let mut band = descriptor();
        band.range_offset = 2.2;
        let path = PathBuf::from("a.znc");

        // 17.9 m matches reference bin 0 without the offset; with +2.2 m it
        // lands inside bin 36's tolerance instead.
        let make_reader = || {
            let mut files = BTreeMap::new();
            files.insert(
                path.clone(),
                Some(raw(array![0.0], array![17.9], array![[7.0]])),
            );
            StubReader { files }
        };

        let without = resampler(descriptor(), 0.0, 36.0);
        let (plain, _) = without.run(&[path.clone()], &make_reader()).unwrap();
        let plain_zg = plain.variable("Zg").unwrap();
        assert_eq!(plain_zg.values[[0, 0]], 7.0);
        assert!(plain_zg.values[[0, 1]].is_nan());

        let with = resampler(band, 0.0, 36.0);
        let (shifted, _) = with.run(&[path.clone()], &make_reader()).unwrap();
        let shifted_zg = shifted.variable("Zg").unwrap();
        assert!(shifted_zg.values[[0, 0]].is_nan());
        assert_eq!(shifted_zg.values[[0, 1]], 7.0);
    }

    #[test]
    fn resample_flags_missing_variable_as_structural() {
        let dataset = Dataset::new(array![0.0], array![0.0]);
        let resampler = resampler(descriptor(), 8.0, 0.0);
        let err = resampler.resample(&dataset).unwrap_err();
        assert!(matches!(err, ResampleError::Structural(_)));
    }

    #[test]
    fn convert_units_applies_db_and_preserves_nan() {
        let mut band = descriptor();
        band.log_convert = vec!["Zg".to_string()];

        let mut dataset = Dataset::new(array![0.0, 4.0], array![0.0]);
        dataset.variables.insert(
            "Zg".to_string(),
            Variable {
                values: array![[100.0], [f64::NAN]],
                units: Some("mm6 m-3".to_string()),
            },
        );

        let resampler = resampler(band, 8.0, 0.0);
        let converted = resampler.convert_units(&dataset);
        let zg = converted.variable("Zg").unwrap();

        assert_eq!(zg.values[[0, 0]], 20.0);
        assert!(zg.values[[1, 0]].is_nan());
        assert_eq!(zg.units.as_deref(), Some(DECIBEL_UNITS));
    }

    #[test]
    fn run_resamples_a_day_end_to_end() {
        let path = PathBuf::from("a.znc");
        let mut files = BTreeMap::new();
        files.insert(
            path.clone(),
            Some(raw(
                array![0.5, 4.5, 20.0],
                array![0.0],
                array![[10.0], [20.0], [30.0]],
            )),
        );
        let reader = StubReader { files };

        let resampler = resampler(descriptor(), 8.0, 0.0);
        let (dataset, report) = resampler.run(&[path], &reader).unwrap();

        assert_eq!(report.merged_files, 1);
        assert_eq!(dataset.time.to_vec(), vec![0.0, 4.0, 8.0]);
        let zg = dataset.variable("Zg").unwrap();
        assert_eq!(zg.values[[0, 0]], 10.0);
        assert_eq!(zg.values[[1, 0]], 20.0);
        assert!(zg.values[[2, 0]].is_nan());
    }

    #[test]
    fn remove_stale_output_is_a_no_op_without_a_file() {
        assert!(remove_stale_output(Path::new("does/not/exist.json")).is_ok());
    }
}
