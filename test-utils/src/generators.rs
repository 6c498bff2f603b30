use common::constants::N_CHANNELS;

/// Raw sample `i` of a ramp: `[3i, 3i + 1, 3i + 2]`. Every value across every
/// channel is distinct, so misplaced or reordered writes are visible.
pub fn ramp_sample(i: usize) -> [f32; N_CHANNELS] {
    let base = (i * N_CHANNELS) as f32;
    [base, base + 1.0, base + 2.0]
}

pub fn ramp(n_samples: usize) -> Vec<[f32; N_CHANNELS]> {
    (0..n_samples).map(ramp_sample).collect()
}
