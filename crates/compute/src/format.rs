/// Renders a number the way it was written in the data: `4` rather than
/// `4.0`, `3.5` rather than `3.50`.
pub fn plain(v: f64) -> String {
    if v == 0.0 {
        // No "-0" in prose.
        return "0".to_string();
    }
    format!("{v}")
}

/// Fixed number of decimals, with exact halves rounded away from zero.
///
/// `format!` rounds exact ties to even (`12.5` -> `12`); dashboard text
/// rounds them up in magnitude (`13`). Values that only look like ties
/// (`1.005` is stored below the half) keep their nearest rounding.
pub fn fixed(v: f64, digits: usize) -> String {
    if v == 0.0 {
        return format!("{:.digits$}", 0.0);
    }
    if let Some(scale) = exact_scale(digits) {
        let scaled = v.abs() * scale;
        // The product is exact when its fused residual is zero.
        let exact = v.abs().mul_add(scale, -scaled) == 0.0;
        if exact && scaled.fract() == 0.5 {
            let magnitude = scaled.round() / scale;
            let sign = if v < 0.0 { "-" } else { "" };
            return format!("{sign}{magnitude:.digits$}");
        }
    }
    format!("{v:.digits$}")
}

/// `10^digits` while it is exactly representable.
fn exact_scale(digits: usize) -> Option<f64> {
    let digits = i32::try_from(digits).ok().filter(|d| *d <= 22)?;
    Some(10f64.powi(digits))
}

#[cfg(test)]
mod tests {
    use super::{fixed, plain};

    #[test]
    fn plain_drops_trailing_zero_fraction() {
        assert_eq!(plain(4.0), "4");
        assert_eq!(plain(3.5), "3.5");
        assert_eq!(plain(-0.0), "0");
    }

    #[test]
    fn fixed_rounds_to_the_requested_digits() {
        assert_eq!(fixed(33.333, 1), "33.3");
        assert_eq!(fixed(1.7, 0), "2");
        assert_eq!(fixed(-1.54, 1), "-1.5");
        assert_eq!(fixed(7.0, 2), "7.00");
    }

    #[test]
    fn fixed_rounds_exact_halves_away_from_zero() {
        assert_eq!(fixed(12.5, 0), "13");
        assert_eq!(fixed(0.5, 0), "1");
        assert_eq!(fixed(1.25, 1), "1.3");
        assert_eq!(fixed(-1.25, 1), "-1.3");
        assert_eq!(fixed(-2.5, 0), "-3");
    }

    #[test]
    fn fixed_keeps_nearest_rounding_for_inexact_halves() {
        // 1.005 is stored as 1.00499999...
        assert_eq!(fixed(1.005, 2), "1.00");
        // 0.15 is stored as 0.1499999...
        assert_eq!(fixed(0.15, 1), "0.1");
    }

    #[test]
    fn fixed_keeps_sign_of_small_negatives_but_not_of_zero() {
        assert_eq!(fixed(-0.04, 1), "-0.0");
        assert_eq!(fixed(-0.0, 1), "0.0");
        assert_eq!(fixed(0.0, 0), "0");
    }
}
