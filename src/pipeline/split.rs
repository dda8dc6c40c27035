//! Stratified train/test partitioning

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{PipelineError, PipelineResult};

/// Row indices of the two disjoint subsets, each ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for a given fraction, rounded up
pub fn test_count(n_samples: usize, test_size: f64) -> usize {
    (test_size * n_samples as f64).ceil() as usize
}

/// Split `labels` into train/test rows keeping each class's share.
///
/// Per-class test quotas are the floor of the proportional share with the
/// leftover rows handed to the classes with the largest remainders, so the
/// total always matches `test_count`. Membership is a pure function of the
/// labels, `test_size` and `seed`.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> PipelineResult<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "test_size must be between 0 and 1 (exclusive), got {}",
            test_size
        )));
    }

    let n = labels.len();
    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::InvalidConfig(format!(
            "test_size {} leaves no rows for one of the subsets ({} rows)",
            test_size, n
        )));
    }

    // Group row indices by class, classes in ascending order
    let mut classes: Vec<u8> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();
    let groups: Vec<Vec<usize>> = classes
        .iter()
        .map(|&class| (0..n).filter(|&i| labels[i] == class).collect())
        .collect();

    let mut quotas: Vec<usize> = Vec::with_capacity(groups.len());
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(groups.len());
    for (k, group) in groups.iter().enumerate() {
        let ideal = group.len() as f64 * n_test as f64 / n as f64;
        quotas.push(ideal.floor() as usize);
        remainders.push((k, ideal - ideal.floor()));
    }

    let mut leftover = n_test - quotas.iter().sum::<usize>();
    remainders.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    for (k, _) in remainders.iter().cycle().take(remainders.len() * 2) {
        if leftover == 0 {
            break;
        }
        if quotas[*k] < groups[*k].len() {
            quotas[*k] += 1;
            leftover -= 1;
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (group, &quota) in groups.iter().zip(quotas.iter()) {
        let mut shuffled = group.clone();
        shuffled.shuffle(&mut rng);
        test.extend_from_slice(&shuffled[..quota]);
        train.extend_from_slice(&shuffled[quota..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(SplitIndices { train, test })
}
