pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Position of the smallest value; the earliest one wins on ties.
    pub fn argmin(values: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in values.iter().enumerate() {
            if best.map(|(_, b)| v < b).unwrap_or(true) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Position of the largest value; the earliest one wins on ties.
    pub fn argmax(values: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in values.iter().enumerate() {
            if best.map(|(_, b)| v > b).unwrap_or(true) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Relative change from `start` to `end` in percent; 0 when `start` is 0.
    pub fn percent_change(start: f64, end: f64) -> f64 {
        if start == 0.0 {
            0.0
        } else {
            (end - start) / start * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn mean_works() {
        let m = Statistics::mean(&[1.0, 2.0, 3.0]).unwrap();
        assert!((m - 2.0).abs() < 1e-9);
        assert!(Statistics::mean(&[]).is_none());
    }

    #[test]
    fn extremes_prefer_first_occurrence() {
        let values = [3.0, 1.0, 5.0, 1.0, 5.0];
        assert_eq!(Statistics::argmin(&values), Some(1));
        assert_eq!(Statistics::argmax(&values), Some(2));
        assert_eq!(Statistics::min_max(&values), Some((1.0, 5.0)));
        assert_eq!(Statistics::argmax(&[]), None);
    }

    #[test]
    fn percent_change_guards_zero_start() {
        assert_eq!(Statistics::percent_change(0.0, 5.0), 0.0);
        assert!((Statistics::percent_change(4.0, 5.0) - 25.0).abs() < 1e-9);
    }
}
