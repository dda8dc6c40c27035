//! Integer label encoding for categorical feature columns
//!
//! Each column gets its own encoder whose classes are the sorted distinct
//! values, so code `i` is the i-th class in lexicographic order. Note that this
//! imposes an ordering on nominal categories; tree models are largely
//! insensitive to it, the linear model is not.
//!
//! Null cells form their own class, distinct from every string value, and
//! sort before all of them (code 0 when the column has nulls).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelEncoder {
    classes: Vec<Option<String>>,
    #[serde(skip)]
    index: BTreeMap<Option<String>, usize>,
}

fn describe(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "null".to_string(),
    }
}

impl LabelEncoder {
    /// Learn the sorted set of categories
    pub fn fit(values: &[Option<String>]) -> Self {
        let mut classes: Vec<Option<String>> = values.to_vec();
        classes.sort();
        classes.dedup();

        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();

        Self { classes, index }
    }

    /// Encode values; a category unseen during `fit` is an error
    pub fn transform(&self, values: &[Option<String>]) -> PipelineResult<Vec<usize>> {
        values
            .iter()
            .map(|v| {
                self.index.get(v).copied().ok_or_else(|| {
                    PipelineError::InvalidConfig(format!(
                        "category {} was not seen when the encoder was fitted",
                        describe(v)
                    ))
                })
            })
            .collect()
    }

    pub fn fit_transform(values: &[Option<String>]) -> (Self, Vec<usize>) {
        let encoder = Self::fit(values);
        let codes = values.iter().map(|v| encoder.index[v]).collect();
        (encoder, codes)
    }

    /// Map codes back to their categories (`None` for the null class)
    pub fn inverse_transform(&self, codes: &[usize]) -> PipelineResult<Vec<Option<String>>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code).cloned().ok_or_else(|| {
                    PipelineError::InvalidConfig(format!(
                        "code {} is out of range for {} classes",
                        code,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }

    pub fn classes(&self) -> &[Option<String>] {
        &self.classes
    }

    /// True when null cells were seen during `fit`
    pub fn has_null_class(&self) -> bool {
        self.classes.first().is_some_and(Option::is_none)
    }
}
