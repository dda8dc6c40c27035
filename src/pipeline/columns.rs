//! Known column names and the capability set built from a loaded table

use std::collections::BTreeSet;

use polars::prelude::*;

/// Outcome of the campaign ("yes" = converted)
pub const LABEL: &str = "y";
/// Call duration in seconds; only known after the call ends
pub const DURATION: &str = "duration";
pub const AGE: &str = "age";
pub const JOB: &str = "job";
pub const MARITAL: &str = "marital";
pub const EDUCATION: &str = "education";
pub const CONTACT: &str = "contact";
pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const CAMPAIGN: &str = "campaign";
pub const PDAYS: &str = "pdays";
pub const QUARTER: &str = "quarter";

/// Label value counted as a conversion
pub const POSITIVE_LABEL: &str = "yes";

/// Exact-name capability check over the columns of a table.
///
/// Presence is a case-sensitive, whole-name match: `age_group` does not make
/// `age` present.
#[derive(Debug, Clone, Default)]
pub struct KnownColumns {
    ordered: Vec<String>,
    names: BTreeSet<String>,
    numeric: BTreeSet<String>,
}

impl KnownColumns {
    pub fn from_frame(df: &DataFrame) -> Self {
        let mut known = Self::default();
        for column in df.get_columns() {
            let name = column.name().to_string();
            if column.dtype().is_primitive_numeric() {
                known.numeric.insert(name.clone());
            }
            known.names.insert(name.clone());
            known.ordered.push(name);
        }
        known
    }

    pub fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Present and stored with a numeric dtype
    pub fn has_numeric(&self, name: &str) -> bool {
        self.numeric.contains(name)
    }

    /// Numeric columns in table column order
    pub fn numeric_in_order(&self) -> Vec<&str> {
        self.ordered
            .iter()
            .filter(|name| self.numeric.contains(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
