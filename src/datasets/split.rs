use anyhow::{bail, ensure, Result};
use candle_core::Device;
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::GraphSample;
use crate::utils::index_to_mask;

// absorbs products such as 0.1 * 30 = 3.0000000000000004 before `ceil`
const SIZE_EPS: f64 = 1e-9;

/// Parameters of the two-stage stratified node split.
///
/// `holdout_size` of the nodes form a pool, and `test_share` of that pool
/// becomes the test set; the rest of the pool is the validation set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub holdout_size: f64,
    pub test_share: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_size: 0.3,
            test_share: 0.5,
            seed: 42,
        }
    }
}

/// Sorted node indices of each split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSplit {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `0..labels.len()` into train/val/test sets preserving class proportions.
///
/// Fails if a class has fewer than two members, or if the pool or the
/// training part would be smaller than the number of classes.
pub fn stratified_split(labels: &[u32], config: &SplitConfig) -> Result<NodeSplit> {
    let indices = (0..labels.len()).collect_vec();
    let (train, pool) = split_stratified(&indices, labels, config.holdout_size, config.seed, true)?;

    let pool_labels = pool.iter().map(|&i| labels[i]).collect_vec();
    let (val, test) = split_stratified(&pool, &pool_labels, config.test_share, config.seed, false)?;
    Ok(NodeSplit { train, val, test })
}

/// Mark the split on `sample` as train/val/test masks.
pub fn attach_split_masks(sample: GraphSample, split: &NodeSplit, device: &Device) -> Result<GraphSample> {
    let n = sample.num_nodes();
    let train_mask = index_to_mask(&split.train, n, device)?;
    let val_mask = index_to_mask(&split.val, n, device)?;
    let test_mask = index_to_mask(&split.test, n, device)?;
    sample.with_masks(train_mask, val_mask, test_mask)
}

/// Number of items held out when splitting off `fraction` of `n`.
pub fn holdout_len(n: usize, fraction: f64) -> usize {
    ((fraction * n as f64 - SIZE_EPS).ceil().max(0.0) as usize).min(n)
}

/// Split `items` into a kept part and a held-out part of `holdout_len`
/// items, stratified by `labels` (aligned with `items`).
///
/// `strict` enforces the minimum class sizes required for a faithful
/// stratification; the non-strict mode allocates as well as it can.
fn split_stratified(
    items: &[usize],
    labels: &[u32],
    fraction: f64,
    seed: u64,
    strict: bool,
) -> Result<(Vec<usize>, Vec<usize>)> {
    ensure!(
        items.len() == labels.len(),
        "{} items but {} labels",
        items.len(),
        labels.len()
    );
    ensure!(
        fraction > 0.0 && fraction < 1.0,
        "split fraction must be in (0, 1), got {fraction}"
    );
    let n = items.len();
    let n_held = holdout_len(n, fraction);

    let classes = items
        .iter()
        .zip(labels)
        .map(|(&item, &label)| (label, item))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(label, _)| *label)
        .collect_vec();

    if strict {
        if let Some((label, members)) = classes.iter().min_by_key(|(_, members)| members.len()) {
            if members.len() < 2 {
                bail!(
                    "the least populated class (label {label}) has only {} member; \
                     at least 2 are required to stratify",
                    members.len()
                );
            }
        }
        ensure!(
            n_held >= classes.len(),
            "held-out size {n_held} is smaller than the number of classes {}",
            classes.len()
        );
        ensure!(
            n - n_held >= classes.len(),
            "kept size {} is smaller than the number of classes {}",
            n - n_held,
            classes.len()
        );
    }

    let counts = classes.iter().map(|(_, members)| members.len()).collect_vec();
    let allocation = allocate(&counts, n_held);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut kept = Vec::with_capacity(n - n_held);
    let mut held = Vec::with_capacity(n_held);
    for ((_, mut members), take) in classes.into_iter().zip(allocation) {
        members.shuffle(&mut rng);
        held.extend_from_slice(&members[..take]);
        kept.extend_from_slice(&members[take..]);
    }
    kept.sort_unstable();
    held.sort_unstable();
    Ok((kept, held))
}

/// Distribute `draws` over classes proportionally to `counts`.
///
/// Each class gets the floor of its share; leftover draws go to the classes
/// with the largest fractional parts, ties to the larger class, then to the
/// earlier class.
fn allocate(counts: &[usize], draws: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }
    let shares = counts
        .iter()
        .map(|&c| draws as f64 * c as f64 / total as f64)
        .collect_vec();
    let mut allocation = shares.iter().map(|s| s.floor() as usize).collect_vec();
    let leftover = draws - allocation.iter().sum::<usize>();

    let order = (0..counts.len()).sorted_by(|&a, &b| {
        let frac = |i: usize| shares[i] - shares[i].floor();
        frac(b)
            .total_cmp(&frac(a))
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });
    for i in order.take(leftover) {
        allocation[i] += 1;
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(n: usize, classes: u32) -> Vec<u32> {
        (0..n).map(|i| i as u32 % classes).collect()
    }

    fn count_label(indices: &[usize], labels: &[u32], label: u32) -> usize {
        indices.iter().filter(|&&i| labels[i] == label).count()
    }

    #[test]
    fn ten_nodes_two_classes() -> Result<()> {
        let labels = balanced(10, 2);
        let split = stratified_split(&labels, &SplitConfig::default())?;
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.val.len(), 1);
        assert_eq!(split.test.len(), 2);

        let mut all = [split.train, split.val, split.test].concat();
        all.sort_unstable();
        assert_eq!(all, (0..10usize).collect_vec());
        Ok(())
    }

    #[test]
    fn proportions_are_preserved() -> Result<()> {
        let labels: Vec<u32> = (0..100).map(|i| if i < 60 { 0 } else { 1 }).collect();
        let split = stratified_split(&labels, &SplitConfig::default())?;
        assert_eq!(split.train.len(), 70);
        assert_eq!(split.val.len(), 15);
        assert_eq!(split.test.len(), 15);

        assert_eq!(count_label(&split.train, &labels, 0), 42);
        assert_eq!(count_label(&split.val, &labels, 0), 9);
        assert_eq!(count_label(&split.test, &labels, 0), 9);
        Ok(())
    }

    #[test]
    fn sizes_for_three_classes() -> Result<()> {
        let labels = balanced(200, 3);
        let split = stratified_split(&labels, &SplitConfig::default())?;
        assert_eq!(split.train.len(), 140);
        assert_eq!(split.val.len() + split.test.len(), 60);
        assert_eq!(split.test.len(), 30);
        for label in 0..3 {
            let total = count_label(&(0..200usize).collect_vec(), &labels, label) as f64;
            let in_train = count_label(&split.train, &labels, label) as f64;
            assert!((in_train / total - 0.7).abs() < 0.02);
        }
        Ok(())
    }

    #[test]
    fn deterministic_for_a_seed() -> Result<()> {
        let labels = balanced(50, 2);
        let a = stratified_split(&labels, &SplitConfig::default())?;
        let b = stratified_split(&labels, &SplitConfig::default())?;
        assert_eq!(a, b);

        let other = SplitConfig {
            seed: 7,
            ..Default::default()
        };
        let c = stratified_split(&labels, &other)?;
        assert_eq!(c.train.len(), a.train.len());
        Ok(())
    }

    #[test]
    fn singleton_class_cannot_be_stratified() {
        let mut labels = balanced(10, 2);
        labels[9] = 2;
        let err = stratified_split(&labels, &SplitConfig::default()).unwrap_err();
        assert!(err.to_string().contains("least populated class"));
    }

    #[test]
    fn too_many_classes_for_the_pool() {
        // 6 nodes: pool of 2 cannot hold 3 classes
        let labels = balanced(6, 3);
        assert!(stratified_split(&labels, &SplitConfig::default()).is_err());
    }

    #[test]
    fn fractions_are_validated() {
        let labels = balanced(10, 2);
        let config = SplitConfig {
            holdout_size: 1.0,
            ..Default::default()
        };
        assert!(stratified_split(&labels, &config).is_err());
    }

    #[test]
    fn allocation_uses_largest_remainder() {
        assert_eq!(allocate(&[5, 5], 3), vec![2, 1]);
        assert_eq!(allocate(&[2, 1], 2), vec![1, 1]);
        assert_eq!(allocate(&[60, 40], 30), vec![18, 12]);
        assert_eq!(allocate(&[1, 1, 1], 0), vec![0, 0, 0]);
    }

    #[test]
    fn holdout_rounds_up() {
        assert_eq!(holdout_len(10, 0.3), 3);
        assert_eq!(holdout_len(3, 0.5), 2);
        assert_eq!(holdout_len(30, 0.1), 3);
        assert_eq!(holdout_len(7, 0.3), 3);
    }

    #[test]
    fn masks_from_split() -> Result<()> {
        let device = Device::Cpu;
        let x = candle_core::Tensor::zeros((10, 1), candle_core::DType::F32, &device)?;
        let edge_index = candle_core::Tensor::zeros((2, 0), candle_core::DType::U32, &device)?;
        let sample = GraphSample::new(x, edge_index)?;
        let split = stratified_split(&balanced(10, 2), &SplitConfig::default())?;
        let sample = attach_split_masks(sample, &split, &device)?;

        let train = sample.train_mask.as_ref().map(|m| m.to_vec1::<u8>()).transpose()?;
        let val = sample.val_mask.as_ref().map(|m| m.to_vec1::<u8>()).transpose()?;
        let test = sample.test_mask.as_ref().map(|m| m.to_vec1::<u8>()).transpose()?;
        let (train, val, test) = (train.unwrap(), val.unwrap(), test.unwrap());
        for i in 0..10 {
            assert_eq!(train[i] + val[i] + test[i], 1);
        }
        Ok(())
    }
}
