use serde::Serialize;

/// Descriptive statistics over a set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for fewer than two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ScoreSummary {
    /// Summarises the finite values among `values`. Returns `None` if there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        let std_dev = (count > 1).then(|| {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            median,
            std_dev,
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_summary() {
        assert_eq!(ScoreSummary::from_values(Vec::<f64>::new()), None);
        assert_eq!(ScoreSummary::from_values([f64::NAN]), None);
    }

    #[test]
    fn single_value_has_no_standard_deviation() {
        let s = ScoreSummary::from_values([0.42]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 0.42);
        assert_eq!(s.median, 0.42);
        assert_eq!(s.std_dev, None);
    }

    #[test]
    fn computes_statistics_for_even_count() {
        let s = ScoreSummary::from_values([0.4, 0.1, 0.3, 0.2]).unwrap();
        assert_eq!(s.count, 4);
        assert!((s.mean - 0.25).abs() < 1e-12);
        assert!((s.median - 0.25).abs() < 1e-12);
        let expected_sd = (0.05f64 / 3.0).sqrt();
        assert!((s.std_dev.unwrap() - expected_sd).abs() < 1e-12);
        assert_eq!(s.min, 0.1);
        assert_eq!(s.max, 0.4);
    }
}
