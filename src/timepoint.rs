//! A single time series sample.

use std::cmp::Ordering;
use std::fmt;

use crate::date::Date;

/// Sentinel stored in place of missing values.
pub const NULL_VALUE: f64 = f64::MAX;

/// One sample: a date and one or more values (water level, u/v, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Timepoint {
    date: Date,
    values: Vec<f64>,
}

impl Default for Timepoint {
    fn default() -> Self {
        Self::scalar(Date::default(), 0.0)
    }
}

impl Timepoint {
    /// Create a sample with an arbitrary number of components.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(date: Date, values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "a timepoint needs at least one value");
        Self { date, values }
    }

    /// Create a one-component sample.
    pub fn scalar(date: Date, value: f64) -> Self {
        Self {
            date,
            values: vec![value],
        }
    }

    /// Create a two-component (u, v) sample.
    pub fn vector(date: Date, u: f64, v: f64) -> Self {
        Self {
            date,
            values: vec![u, v],
        }
    }

    /// An epoch sample holding a single null.
    pub fn null() -> Self {
        Self::scalar(Date::default(), NULL_VALUE)
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn set_date(&mut self, date: Date) {
        self.date = date;
    }

    /// First component.
    pub fn value(&self) -> f64 {
        self.values[0]
    }

    /// Component `index`, if present.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> bool {
        match self.values.get_mut(index) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Replace all components; the dimension follows `values`.
    pub fn set_values(&mut self, values: Vec<f64>) {
        assert!(!values.is_empty(), "a timepoint needs at least one value");
        self.values = values;
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Resize to `n` components, padding with nulls.
    pub fn redimension(&mut self, n: usize) {
        assert!(n > 0, "a timepoint needs at least one value");
        self.values.resize(n, NULL_VALUE);
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).map_or(true, |&v| v == NULL_VALUE)
    }

    fn any_null(&self) -> bool {
        self.values.iter().any(|&v| v == NULL_VALUE)
    }

    /// Euclidean norm of all components.
    pub fn magnitude(&self) -> f64 {
        if self.any_null() {
            return NULL_VALUE;
        }
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Direction of the (u, v) pair in degrees, in [0, 360).
    pub fn direction(&self) -> f64 {
        if self.values.len() < 2 || self.is_null(0) || self.is_null(1) {
            return NULL_VALUE;
        }
        let a = self.values[1].atan2(self.values[0]).to_degrees();
        if a < 0.0 {
            a + 360.0
        } else if a >= 360.0 {
            a - 360.0
        } else {
            a
        }
    }

    /// Move the sample in time and offset every non-null component.
    pub fn shift(&mut self, seconds: i64, offset: f64) {
        self.date.add_seconds(seconds);
        for v in self.values.iter_mut().filter(|v| **v != NULL_VALUE) {
            *v += offset;
        }
    }

    /// Order by date, values ignored.
    pub fn cmp_date(&self, other: &Timepoint) -> Ordering {
        self.date.cmp(&other.date)
    }

    /// Dates equal, values ignored.
    pub fn same_date(a: &Timepoint, b: &Timepoint) -> bool {
        a.date == b.date
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date)?;
        for v in &self.values {
            if *v == NULL_VALUE {
                write!(f, " null")?;
            } else {
                write!(f, " {}", v)?;
            }
        }
        Ok(())
    }
}
