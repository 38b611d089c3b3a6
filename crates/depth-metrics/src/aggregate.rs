//! Per-dataset storage and NaN-skipping aggregation of sample metrics.
//!
//! A sample whose metric is undefined (no valid pixels, no edges) carries
//! `NaN` in that slot. Aggregation skips such entries instead of letting them
//! poison the dataset mean.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{directed::DirectedErrors, global::GlobalErrors};

/// Mean over the non-`NaN` entries of `values`; `NaN` if there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut state = NanMeanState::default();
    for &value in values {
        state.update(value);
    }
    state.value()
}

/// Running NaN-skipping mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NanMeanState {
    sum: f64,
    count: usize,
}

impl NanMeanState {
    /// Adds `value` unless it is `NaN`.
    pub fn update(&mut self, value: f64) {
        if !value.is_nan() {
            self.sum += value;
            self.count += 1;
        }
    }

    /// Number of values that entered the mean.
    pub const fn count(&self) -> usize {
        self.count
    }

    pub fn value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which component produces a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    Global,
    Boundary,
    Directed,
}

/// The twelve per-sample scalars, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    AbsRel,
    SqRel,
    Rms,
    Log10,
    Thr1,
    Thr2,
    Thr3,
    DbeAcc,
    DbeCom,
    #[serde(rename = "dde_0")]
    Dde0,
    DdeM,
    DdeP,
}

impl MetricName {
    pub const ALL: [Self; 12] = [
        Self::AbsRel,
        Self::SqRel,
        Self::Rms,
        Self::Log10,
        Self::Thr1,
        Self::Thr2,
        Self::Thr3,
        Self::DbeAcc,
        Self::DbeCom,
        Self::Dde0,
        Self::DdeM,
        Self::DdeP,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AbsRel => "abs_rel",
            Self::SqRel => "sq_rel",
            Self::Rms => "rms",
            Self::Log10 => "log10",
            Self::Thr1 => "thr1",
            Self::Thr2 => "thr2",
            Self::Thr3 => "thr3",
            Self::DbeAcc => "dbe_acc",
            Self::DbeCom => "dbe_com",
            Self::Dde0 => "dde_0",
            Self::DdeM => "dde_m",
            Self::DdeP => "dde_p",
        }
    }

    pub const fn group(self) -> MetricGroup {
        match self {
            Self::AbsRel
            | Self::SqRel
            | Self::Rms
            | Self::Log10
            | Self::Thr1
            | Self::Thr2
            | Self::Thr3 => MetricGroup::Global,
            Self::DbeAcc | Self::DbeCom => MetricGroup::Boundary,
            Self::Dde0 | Self::DdeM | Self::DdeP => MetricGroup::Directed,
        }
    }

    /// Directed errors are stored as fractions but reported in percent.
    pub const fn is_percentage(self) -> bool {
        matches!(self.group(), MetricGroup::Directed)
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The metric suite of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleMetrics {
    pub abs_rel: f64,
    pub sq_rel: f64,
    pub rms: f64,
    pub log10: f64,
    pub thr1: f64,
    pub thr2: f64,
    pub thr3: f64,
    pub dbe_acc: f64,
    pub dbe_com: f64,
    pub dde_0: f64,
    pub dde_m: f64,
    pub dde_p: f64,
}

impl SampleMetrics {
    /// Every metric undefined; recorded for samples that could not be evaluated.
    pub const fn nan() -> Self {
        Self {
            abs_rel: f64::NAN,
            sq_rel: f64::NAN,
            rms: f64::NAN,
            log10: f64::NAN,
            thr1: f64::NAN,
            thr2: f64::NAN,
            thr3: f64::NAN,
            dbe_acc: f64::NAN,
            dbe_com: f64::NAN,
            dde_0: f64::NAN,
            dde_m: f64::NAN,
            dde_p: f64::NAN,
        }
    }

    pub fn from_components(
        global: &GlobalErrors,
        dbe_acc: f64,
        dbe_com: f64,
        directed: &DirectedErrors,
    ) -> Self {
        Self {
            abs_rel: global.abs_rel,
            sq_rel: global.sq_rel,
            rms: global.rms,
            log10: global.log10,
            thr1: global.thr1,
            thr2: global.thr2,
            thr3: global.thr3,
            dbe_acc,
            dbe_com,
            dde_0: directed.dde_0,
            dde_m: directed.dde_m,
            dde_p: directed.dde_p,
        }
    }

    pub const fn get(&self, name: MetricName) -> f64 {
        match name {
            MetricName::AbsRel => self.abs_rel,
            MetricName::SqRel => self.sq_rel,
            MetricName::Rms => self.rms,
            MetricName::Log10 => self.log10,
            MetricName::Thr1 => self.thr1,
            MetricName::Thr2 => self.thr2,
            MetricName::Thr3 => self.thr3,
            MetricName::DbeAcc => self.dbe_acc,
            MetricName::DbeCom => self.dbe_com,
            MetricName::Dde0 => self.dde_0,
            MetricName::DdeM => self.dde_m,
            MetricName::DdeP => self.dde_p,
        }
    }

    pub fn set(&mut self, name: MetricName, value: f64) {
        let slot = match name {
            MetricName::AbsRel => &mut self.abs_rel,
            MetricName::SqRel => &mut self.sq_rel,
            MetricName::Rms => &mut self.rms,
            MetricName::Log10 => &mut self.log10,
            MetricName::Thr1 => &mut self.thr1,
            MetricName::Thr2 => &mut self.thr2,
            MetricName::Thr3 => &mut self.thr3,
            MetricName::DbeAcc => &mut self.dbe_acc,
            MetricName::DbeCom => &mut self.dbe_com,
            MetricName::Dde0 => &mut self.dde_0,
            MetricName::DdeM => &mut self.dde_m,
            MetricName::DdeP => &mut self.dde_p,
        };
        *slot = value;
    }
}

/// One scalar per sample, indexed by sample order.
///
/// Slots start out as `NaN`, so a sample that is never recorded does not
/// contribute to the mean.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricVector {
    values: Vec<f64>,
}

impl MetricVector {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![f64::NAN; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn nan_mean(&self) -> f64 {
        nan_mean(&self.values)
    }
}

/// Twelve [`MetricVector`]s sized for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    columns: Vec<MetricVector>,
    len: usize,
}

impl MetricTable {
    pub fn new(len: usize) -> Self {
        Self {
            columns: MetricName::ALL.iter().map(|_| MetricVector::new(len)).collect(),
            len,
        }
    }

    /// Number of sample slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes every metric of sample `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn record(&mut self, index: usize, metrics: &SampleMetrics) {
        for name in MetricName::ALL {
            self.columns[name.slot()].set(index, metrics.get(name));
        }
    }

    pub fn column(&self, name: MetricName) -> &MetricVector {
        &self.columns[name.slot()]
    }

    /// Metrics of sample `index` as recorded so far.
    pub fn sample(&self, index: usize) -> Option<SampleMetrics> {
        if index >= self.len {
            return None;
        }
        let mut metrics = SampleMetrics::nan();
        for name in MetricName::ALL {
            metrics.set(name, self.columns[name.slot()].as_slice()[index]);
        }
        Some(metrics)
    }

    /// NaN-skipping mean of every column.
    pub fn mean(&self) -> SampleMetrics {
        let mut mean = SampleMetrics::nan();
        for name in MetricName::ALL {
            mean.set(name, self.column(name).nan_mean());
        }
        mean
    }
}
