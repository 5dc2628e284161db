use crate::domain::errors::ModelError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Shuffles `items` with a seeded RNG and holds out `round(test_fraction * n)`
/// of them for testing. Train and test partition the input.
pub fn train_test_split<T: Clone>(
    items: &[T],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit<T>, ModelError> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(ModelError::InvalidParameter {
            name: "test_fraction",
            reason: format!("must be within [0, 1), got {}", test_fraction),
        });
    }

    let mut indices: Vec<usize> = (0..items.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((items.len() as f64) * test_fraction).round() as usize;
    let (test_idx, train_idx) = indices.split_at(test_len.min(items.len()));

    Ok(TrainTestSplit {
        train: train_idx.iter().map(|&i| items[i].clone()).collect(),
        test: test_idx.iter().map(|&i| items[i].clone()).collect(),
    })
}
