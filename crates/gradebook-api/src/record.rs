//! Student record types.
//!
//! A [`StudentRecord`] holds a student's credentials and the raw inputs of
//! their academic score. The score itself is derived: it can only change
//! through the `record_*` methods, which recompute it after every update.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::calc_academic;

/// Every student record, keyed by student id.
pub type Students = BTreeMap<String, StudentRecord>;

/// A single student's stored academic and credential data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Display name, set at signup.
    #[serde(default)]
    pub name: String,

    /// Plaintext password, set at signup.
    #[serde(default)]
    pub password: String,

    /// Test percentage in `[0, 100]`, or `None` when no test is recorded.
    #[serde(default, serialize_with = "js_number::serialize")]
    pub test: Option<f64>,

    /// Sessions attended.
    #[serde(default)]
    pub att: u32,

    /// Sessions held.
    #[serde(default)]
    pub att_total: u32,

    /// Homework assignments completed.
    #[serde(default)]
    pub hw: u32,

    /// Homework assignments set.
    #[serde(default)]
    pub hw_total: u32,

    /// Derived academic score in `[0, 10]`; `None` until the first update.
    #[serde(default, serialize_with = "js_number::serialize")]
    pub(crate) academic: Option<f64>,
}

impl StudentRecord {
    /// Creates an unscored record with no test, attendance or homework.
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            test: None,
            att: 0,
            att_total: 0,
            hw: 0,
            hw_total: 0,
            academic: None,
        }
    }

    /// Returns the academic score, or `None` if it has never been computed.
    #[must_use]
    pub const fn academic(&self) -> Option<f64> {
        self.academic
    }

    /// Sets the test percentage and recomputes the academic score.
    pub fn record_test(&mut self, percentage: f64) {
        self.test = Some(percentage);
        calc_academic(self);
    }

    /// Sets attendance and recomputes the academic score.
    pub fn record_attendance(&mut self, present: u32, total: u32) {
        self.att = present;
        self.att_total = total;
        calc_academic(self);
    }

    /// Sets homework completion and recomputes the academic score.
    pub fn record_homework(&mut self, done: u32, total: u32) {
        self.hw = done;
        self.hw_total = total;
        calc_academic(self);
    }
}

/// Writes whole-valued numbers without a fractional part (`60`, not `60.0`).
mod js_number {
    use serde::Serializer;

    /// Largest magnitude below which every integral `f64` fits an `i64` exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    #[allow(clippy::ref_option, clippy::cast_possible_truncation)]
    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *value {
            Some(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT => {
                serializer.serialize_i64(v as i64)
            }
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }
}
