//! In-process metric registry with Prometheus text exposition.
//!
//! A registry owns a list of metric families in registration order. Each
//! family carries a fixed set of label keys and a table of series, one per
//! label combination, kept in first-write order. Series values are `f64`
//! bit patterns stored in `AtomicU64`, so updates to an existing series only
//! need a read lock on the family.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::error::MetricsError;

/// The kind of a registered metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        AtomicF64(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    fn fetch_add(&self, delta: f64) {
        // The closure never returns None, so the update always lands.
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            });
    }
}

#[derive(Default)]
struct SeriesTable {
    index: HashMap<Vec<String>, usize>,
    entries: Vec<(Vec<String>, AtomicF64)>,
}

struct MetricFamily {
    name: String,
    help: String,
    kind: MetricKind,
    label_keys: Vec<String>,
    series: RwLock<SeriesTable>,
}

impl MetricFamily {
    /// Maps caller-supplied labels onto the declared key order.
    fn resolve_labels(&self, labels: &[(&str, &str)]) -> Result<Vec<String>, MetricsError> {
        let invalid = |reason: String| MetricsError::InvalidLabel {
            name: self.name.clone(),
            reason,
        };

        if labels.len() != self.label_keys.len() {
            return Err(invalid(format!(
                "expected labels {:?}, got {} label(s)",
                self.label_keys,
                labels.len()
            )));
        }

        let mut values: Vec<Option<&str>> = vec![None; self.label_keys.len()];
        for (key, value) in labels {
            let position = self
                .label_keys
                .iter()
                .position(|declared| declared == key)
                .ok_or_else(|| invalid(format!("undeclared label key '{}'", key)))?;
            if values[position].replace(*value).is_some() {
                return Err(invalid(format!("label key '{}' given more than once", key)));
            }
        }

        Ok(values.into_iter().flatten().map(str::to_owned).collect())
    }

    fn read_series(&self) -> RwLockReadGuard<'_, SeriesTable> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_series(&self) -> RwLockWriteGuard<'_, SeriesTable> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `update` against the series for `values`, creating it at zero first if needed.
    fn with_series(&self, values: Vec<String>, update: impl Fn(&AtomicF64)) {
        {
            let table = self.read_series();
            if let Some(&slot) = table.index.get(&values) {
                update(&table.entries[slot].1);
                return;
            }
        }

        let mut table = self.write_series();
        let slot = match table.index.get(&values) {
            Some(&slot) => slot,
            None => {
                let slot = table.entries.len();
                table.index.insert(values.clone(), slot);
                table.entries.push((values, AtomicF64::new(0.0)));
                slot
            }
        };
        update(&table.entries[slot].1);
    }

    fn get(&self, labels: &[(&str, &str)]) -> Result<Option<f64>, MetricsError> {
        let values = self.resolve_labels(labels)?;
        let table = self.read_series();
        Ok(table
            .index
            .get(&values)
            .map(|&slot| table.entries[slot].1.load()))
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", self.name, self.kind.as_str());

        let table = self.read_series();
        for (values, value) in &table.entries {
            out.push_str(&self.name);
            if !self.label_keys.is_empty() {
                let pairs = self
                    .label_keys
                    .iter()
                    .zip(values)
                    .map(|(key, value)| format!("{}=\"{}\"", key, escape_label_value(value)))
                    .collect::<Vec<_>>()
                    .join(",");
                let _ = write!(out, "{{{}}}", pairs);
            }
            let _ = writeln!(out, " {}", format_value(value.load()));
        }
    }
}

/// Owns every metric of the process.
///
/// Cloning yields another handle to the same registry; separate calls to
/// [`MetricRegistry::new`] are fully independent.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    families: Arc<RwLock<Vec<Arc<MetricFamily>>>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a monotonic counter, or returns the existing one if the
    /// same name was already registered as a counter with identical label keys.
    pub fn create_counter(
        &self,
        name: &str,
        description: &str,
        label_keys: &[&str],
    ) -> Result<Counter, MetricsError> {
        let family = self.register(name, description, label_keys, MetricKind::Counter)?;
        Ok(Counter { family })
    }

    /// Registers a gauge; same idempotency rules as [`MetricRegistry::create_counter`].
    pub fn create_gauge(
        &self,
        name: &str,
        description: &str,
        label_keys: &[&str],
    ) -> Result<Gauge, MetricsError> {
        let family = self.register(name, description, label_keys, MetricKind::Gauge)?;
        Ok(Gauge { family })
    }

    /// Renders every metric in the Prometheus text exposition format.
    ///
    /// Metrics appear in registration order and series in first-write
    /// order. Each value is read atomically, but values of different
    /// series are not read at one common instant.
    pub fn render_snapshot(&self) -> String {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        for family in families.iter() {
            family.render(&mut out);
        }
        out
    }

    fn register(
        &self,
        name: &str,
        description: &str,
        label_keys: &[&str],
        kind: MetricKind,
    ) -> Result<Arc<MetricFamily>, MetricsError> {
        validate_metric_name(name)?;
        validate_label_keys(label_keys)?;

        let mut families = self.families.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = families.iter().find(|family| family.name == name) {
            if existing.kind != kind {
                return Err(MetricsError::DuplicateMetric {
                    name: name.to_string(),
                    reason: format!("already registered as a {}", existing.kind.as_str()),
                });
            }
            if !existing
                .label_keys
                .iter()
                .map(String::as_str)
                .eq(label_keys.iter().copied())
            {
                return Err(MetricsError::DuplicateMetric {
                    name: name.to_string(),
                    reason: format!("already registered with label keys {:?}", existing.label_keys),
                });
            }
            return Ok(existing.clone());
        }

        let family = Arc::new(MetricFamily {
            name: name.to_string(),
            help: description.to_string(),
            kind,
            label_keys: label_keys.iter().map(|key| key.to_string()).collect(),
            series: RwLock::new(SeriesTable::default()),
        });
        families.push(family.clone());

        debug!(metric = name, kind = kind.as_str(), "Registered metric");
        Ok(family)
    }
}

/// Handle to a registered counter.
#[derive(Clone)]
pub struct Counter {
    family: Arc<MetricFamily>,
}

impl Counter {
    /// Metric name as registered.
    pub fn name(&self) -> &str {
        &self.family.name
    }

    /// Adds `delta` to the series identified by `labels`.
    ///
    /// Rejects negative or NaN deltas and labels that do not match the
    /// declared keys; a rejected call leaves every value untouched.
    pub fn add(&self, labels: &[(&str, &str)], delta: f64) -> Result<(), MetricsError> {
        let values = self.family.resolve_labels(labels)?;
        if delta.is_nan() || delta < 0.0 {
            return Err(MetricsError::NegativeDelta {
                name: self.family.name.clone(),
                delta,
            });
        }
        self.family
            .with_series(values, |value| value.fetch_add(delta));
        Ok(())
    }

    /// Adds 1; see [`Counter::add`].
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<(), MetricsError> {
        self.add(labels, 1.0)
    }

    /// Current value, or `None` if the label combination was never written.
    pub fn get(&self, labels: &[(&str, &str)]) -> Result<Option<f64>, MetricsError> {
        self.family.get(labels)
    }
}

/// Handle to a registered gauge.
#[derive(Clone)]
pub struct Gauge {
    family: Arc<MetricFamily>,
}

impl Gauge {
    /// Metric name as registered.
    pub fn name(&self) -> &str {
        &self.family.name
    }

    /// Overwrites the series identified by `labels` with `value`.
    pub fn set(&self, labels: &[(&str, &str)], value: f64) -> Result<(), MetricsError> {
        let values = self.family.resolve_labels(labels)?;
        self.family.with_series(values, |slot| slot.store(value));
        Ok(())
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Result<Option<f64>, MetricsError> {
        self.family.get(labels)
    }
}

fn validate_metric_name(name: &str) -> Result<(), MetricsError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(MetricsError::InvalidName {
            name: name.to_string(),
            reason: "metric names must match [a-zA-Z_:][a-zA-Z0-9_:]*".to_string(),
        })
    }
}

fn validate_label_keys(label_keys: &[&str]) -> Result<(), MetricsError> {
    for (position, key) in label_keys.iter().enumerate() {
        let mut chars = key.chars();
        let well_formed = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        let reason = if !well_formed {
            "label keys must match [a-zA-Z_][a-zA-Z0-9_]*"
        } else if key.starts_with("__") {
            "label keys starting with '__' are reserved"
        } else if label_keys[..position].contains(key) {
            "label key declared more than once"
        } else {
            continue;
        };
        return Err(MetricsError::InvalidName {
            name: key.to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
