//! Summary text and per-sample records of an evaluation run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use depth_metrics::SampleMetrics;
use serde::Serialize;

use crate::{
    error::{EvalError, EvalResult},
    evaluator::EvaluationReport,
};

/// Renders the dataset summary.
///
/// Values are the NaN-skipping means; directed errors are shown in percent.
/// Undefined means print as `nan`.
pub fn format_summary(mean: &SampleMetrics) -> String {
    let sections: [(&str, &[(&str, f64)]); 3] = [
        (
            "Global Error Metrics",
            &[
                ("rel    =  ", mean.abs_rel),
                ("log10  =  ", mean.log10),
                ("rms    =  ", mean.rms),
                ("thr1   =  ", mean.thr1),
                ("thr2   =  ", mean.thr2),
                ("thr3   =  ", mean.thr3),
            ],
        ),
        (
            "Depth Boundary Error Metrics",
            &[("dbe_acc = ", mean.dbe_acc), ("dbe_com = ", mean.dbe_com)],
        ),
        (
            "Directed Depth Error Metrics",
            &[
                ("dde_0  = ", mean.dde_0 * 100.0),
                ("dde_m  = ", mean.dde_m * 100.0),
                ("dde_p  = ", mean.dde_p * 100.0),
            ],
        ),
    ];

    let mut out = String::new();
    for (title, lines) in sections {
        out.push_str(&format!("############ {title} #################\n"));
        for (label, value) in lines {
            out.push_str(&format!("{label}{}\n", fixed3(*value)));
        }
    }
    out.push('\n');
    out
}

fn fixed3(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else {
        format!("{value:.3}")
    }
}

/// Per-sample entry of `metrics.json`. Undefined metrics serialize as `null`.
#[derive(Debug, Serialize)]
struct SampleRecord<'a> {
    index: usize,
    name: &'a str,
    failed: bool,
    #[serde(flatten)]
    metrics: SampleMetrics,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    mode: &'a str,
    mean: SampleMetrics,
    samples: Vec<SampleRecord<'a>>,
}

/// Path of the summary file for `mode` inside `dir`.
pub fn summary_path(dir: &Path, mode: &str) -> PathBuf {
    dir.join(format!("testing_{mode}.txt"))
}

/// Writes `testing_<mode>.txt` and `metrics.json` into `dir`.
///
/// Returns the two paths.
pub fn write_report(report: &EvaluationReport, dir: &Path) -> EvalResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).map_err(|source| EvalError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mean = report.mean();
    let summary = summary_path(dir, &report.mode);
    write_file(&summary, format_summary(&mean))?;

    let mut failed = vec![false; report.names.len()];
    for &index in &report.failed {
        if let Some(flag) = failed.get_mut(index) {
            *flag = true;
        }
    }
    let samples = report
        .names
        .iter()
        .enumerate()
        .map(|(index, name)| SampleRecord {
            index,
            name,
            failed: failed[index],
            metrics: report.table.sample(index).unwrap_or_else(SampleMetrics::nan),
        })
        .collect();
    let document = ReportDocument {
        mode: &report.mode,
        mean,
        samples,
    };
    let json = serde_json::to_string_pretty(&document).map_err(|source| {
        EvalError::SerializeFailed {
            what: "metrics report",
            source,
        }
    })?;
    let records = dir.join("metrics.json");
    write_file(&records, json)?;

    Ok((summary, records))
}

fn write_file(path: &Path, contents: String) -> EvalResult<()> {
    fs::write(path, contents).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use depth_metrics::MetricTable;

    use super::*;

    fn metrics() -> SampleMetrics {
        SampleMetrics {
            abs_rel: 0.1234,
            sq_rel: 0.05,
            rms: 0.5,
            log10: 0.04,
            thr1: 0.8,
            thr2: 0.9,
            thr3: 0.95,
            dbe_acc: 2.25,
            dbe_com: f64::NAN,
            dde_0: 0.85,
            dde_m: 0.1,
            dde_p: 0.05,
        }
    }

    #[test]
    fn summary_matches_the_report_layout() {
        let expected = "\
############ Global Error Metrics #################
rel    =  0.123
log10  =  0.040
rms    =  0.500
thr1   =  0.800
thr2   =  0.900
thr3   =  0.950
############ Depth Boundary Error Metrics #################
dbe_acc = 2.250
dbe_com = nan
############ Directed Depth Error Metrics #################
dde_0  = 85.000
dde_m  = 10.000
dde_p  = 5.000

";
        assert_eq!(format_summary(&metrics()), expected);
    }

    #[test]
    fn report_files_are_written() {
        let dir = std::env::temp_dir().join(format!("depth-eval-report-{}", std::process::id()));
        let mut table = MetricTable::new(2);
        table.record(0, &metrics());
        let report = EvaluationReport {
            mode: "gt".to_owned(),
            names: vec!["a".to_owned(), "b".to_owned()],
            table,
            failed: vec![1],
        };

        let (summary, records) = write_report(&report, &dir).unwrap();
        assert_eq!(summary, dir.join("testing_gt.txt"));
        assert!(fs::read_to_string(&summary)
            .unwrap()
            .contains("dbe_acc = 2.250"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&records).unwrap()).unwrap();
        assert_eq!(json["mode"], "gt");
        assert_eq!(json["samples"][0]["name"], "a");
        assert_eq!(json["samples"][1]["failed"], true);
        assert!(json["samples"][1]["rms"].is_null());
        assert_eq!(json["samples"][0]["rms"], 0.5);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_flags_follow_the_failed_list() {
        let dir = std::env::temp_dir().join(format!("depth-eval-flags-{}", std::process::id()));
        let mut table = MetricTable::new(3);
        table.record(1, &metrics());
        let report = EvaluationReport {
            mode: "pred".to_owned(),
            names: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            table,
            failed: vec![2, 0],
        };

        let (_, records) = write_report(&report, &dir).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&records).unwrap()).unwrap();
        let flags: Vec<bool> = (0..3)
            .map(|i| json["samples"][i]["failed"].as_bool().unwrap())
            .collect();
        assert_eq!(flags, [true, false, true]);
        fs::remove_dir_all(&dir).ok();
    }
}
