pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Smallest and largest value, ignoring NaN.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_finish_times() {
        assert_eq!(mean(&[5400.0, 6000.0, 6600.0]), Some(6000.0));
        assert_eq!(mean(&[7200.0]), Some(7200.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev_of_finish_times() {
        assert_eq!(std_dev(&[4000.0, 6000.0]), Some(1000.0));
        assert_eq!(std_dev(&[6000.0, 6000.0, 6000.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);

        let sd = std_dev(&[5000.0, 5500.0, 7000.0]).unwrap();
        assert!((sd - 849.836585).abs() < 1e-5);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[6.0, 2.0, f64::NAN, 9.0]), Some((2.0, 9.0)));
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[f64::NAN]), None);
    }
}
