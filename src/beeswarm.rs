//! Horizontal offsets that spread overlapping points into a swarm.

use crate::stats::Histogram;

/// Spread used by the between-group plot.
pub const DEFAULT_WIDTH: f64 = 0.15;

/// Compute one x-offset per value of `y`.
///
/// Values are binned into `ceil(n / 6)` equal-width bins. Inside each bin the
/// points are visited in ascending order and alternate right/left, moving one
/// step `dx` further out on each side, where
/// `dx = width / max(max_bin_count / 2, 1)`. Non-finite values stay at 0.
pub fn beeswarm(y: &[f64], width: f64) -> Vec<f64> {
    let mut offsets = vec![0.0; y.len()];
    if y.is_empty() {
        return offsets;
    }
    let nbins = y.len().div_ceil(6);
    let hist = Histogram::new(y, nbins);
    let dx = width / (hist.max_count() / 2).max(1) as f64;

    let mut bins: Vec<Vec<usize>> = vec![Vec::new(); nbins];
    for (i, &v) in y.iter().enumerate() {
        if let Some(b) = hist.bin_index(v) {
            bins[b].push(i);
        }
    }
    for members in &mut bins {
        members.sort_by(|&a, &b| y[a].total_cmp(&y[b]));
        for (pos, &i) in members.iter().enumerate() {
            let step = dx * (0.5 + (pos / 2) as f64);
            offsets[i] = if pos % 2 == 0 { step } else { -step };
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn empty_input() {
        assert!(beeswarm(&[], 0.15).is_empty());
    }

    #[test]
    fn single_bin_alternates_sides() {
        let out = beeswarm(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 0.3);
        assert!(close(&out, &[0.05, -0.05, 0.15, -0.15, 0.25, -0.25]));
    }

    #[test]
    fn order_follows_value_not_position() {
        let out = beeswarm(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0], 0.3);
        assert!(close(&out, &[-0.25, 0.25, -0.15, 0.15, -0.05, 0.05]));
    }

    #[test]
    fn single_point_sits_half_a_step_right() {
        assert!(close(&beeswarm(&[3.0], 0.15), &[0.075]));
    }

    #[test]
    fn offsets_stay_within_width() {
        let y: Vec<f64> = (0..40).map(|i| ((i * 7) % 13) as f64).collect();
        let w = 0.15;
        let out = beeswarm(&y, w);
        let max_count = Histogram::new(&y, y.len().div_ceil(6)).max_count();
        let bound = w / (max_count / 2).max(1) as f64 * (0.5 + ((max_count - 1) / 2) as f64);
        assert!(out.iter().all(|o| o.abs() <= bound + 1e-12));
        assert!(out.iter().all(|o| *o != 0.0));
    }

    #[test]
    fn nan_is_left_in_place() {
        let out = beeswarm(&[1.0, f64::NAN, 2.0], 0.15);
        assert_eq!(out[1], 0.0);
        assert!(out[0] > 0.0 && out[2] < 0.0);
    }
}
