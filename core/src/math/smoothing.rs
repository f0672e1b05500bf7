/// One-dimensional Gaussian filter with half-sample symmetric boundaries
/// (`d c b a | a b c d | d c b a`). The kernel is truncated at four sigma
/// or at the signal length, whichever is shorter.
pub fn gaussian_filter1d(samples: &[f64], sigma: f64) -> Vec<f64> {
    if samples.is_empty() || !(sigma > 0.0) || !sigma.is_finite() {
        return samples.to_vec();
    }

    let n = samples.len() as isize;
    let radius = ((4.0 * sigma + 0.5) as isize).min(n);
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= total);

    (0..n)
        .map(|center| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(w, offset)| w * samples[reflect(center + offset, n)])
                .sum::<f64>()
        })
        .collect()
}

fn reflect(index: isize, len: isize) -> usize {
    let period = 2 * len;
    let folded = index.rem_euclid(period);
    if folded < len {
        folded as usize
    } else {
        (period - folded - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_is_unchanged() {
        let smoothed = gaussian_filter1d(&[5.0; 16], 3.0);
        assert!(smoothed.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn kernel_wider_than_signal_still_reflects() {
        let smoothed = gaussian_filter1d(&[1.0, 2.0, 3.0], 10.0);
        assert_eq!(smoothed.len(), 3);
        assert!(smoothed.iter().all(|v| *v > 1.0 && *v < 3.0));
    }

    #[test]
    fn huge_sigma_is_bounded_by_signal_length() {
        let smoothed = gaussian_filter1d(&[1.0, 2.0, 3.0, 4.0], 1e12);
        assert_eq!(smoothed.len(), 4);
        assert!(smoothed.iter().all(|v| *v > 1.0 && *v < 4.0));
    }

    #[test]
    fn non_positive_sigma_is_identity() {
        assert_eq!(gaussian_filter1d(&[1.0, 9.0], 0.0), vec![1.0, 9.0]);
    }

    #[test]
    fn reflect_folds_both_edges() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(9, 4), 1);
    }
}
