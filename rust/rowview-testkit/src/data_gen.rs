//! Randomized data generation for testing.
//!
//! All generators take an explicit `fastrand::Rng` so failures can be replayed
//! from a seed.

use rowview_source::{MatrixRowSource, Value};

/// Generates an `(_id, key, payload)` table of `rows` rows.
///
/// `key` is drawn from `k0..k{distinct_keys}`, with roughly one row in ten set
/// to NULL when `with_nulls` is set. `_id` is the row position and `payload` a
/// random integer.
pub fn random_keyed_table(
    rng: &mut fastrand::Rng,
    rows: usize,
    distinct_keys: usize,
    with_nulls: bool,
) -> MatrixRowSource {
    assert_ne!(distinct_keys, 0);
    let mut table = MatrixRowSource::new(["_id", "key", "payload"]);
    for id in 0..rows {
        let key = if with_nulls && rng.u8(0..10) == 0 {
            Value::Null
        } else {
            Value::Text(format!("k{}", rng.usize(0..distinct_keys)))
        };
        table
            .add_row(vec![Value::Integer(id as i64), key, Value::Integer(rng.i64(..))])
            .expect("row width");
    }
    table
}

/// Generates `len` indices into a sequence of `target_len` elements, with
/// repetitions allowed.
pub fn random_arrangement(rng: &mut fastrand::Rng, target_len: usize, len: usize) -> Vec<usize> {
    if target_len == 0 {
        return Vec::new();
    }
    (0..len).map(|_| rng.usize(0..target_len)).collect()
}

/// Generates a random permutation of `0..len`.
pub fn random_permutation(rng: &mut fastrand::Rng, len: usize) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..len).collect();
    rng.shuffle(&mut permutation);
    permutation
}
