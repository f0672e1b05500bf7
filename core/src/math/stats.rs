pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Population variance (divides by `n`).
    pub fn variance(samples: &[f64]) -> f64 {
        Self::covariance(samples, samples)
    }

    /// Population covariance over the common prefix of both slices.
    pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len().min(y.len());
        if n == 0 {
            return 0.0;
        }
        let (x, y) = (&x[..n], &y[..n]);
        let mean_x = Self::mean(x);
        let mean_y = Self::mean(y);
        x.iter()
            .zip(y)
            .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
            .sum::<f64>()
            / n as f64
    }
}
