use crate::util::min_max;

/// Axis bounds covering every point and the runner, with a little air.
/// Points are (age, finish minutes).
pub fn chart_bounds(points: &[(f64, f64)], runner: (f64, f64)) -> ([f64; 2], [f64; 2]) {
    let xs: Vec<f64> = points.iter().map(|p| p.0).chain([runner.0]).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).chain([runner.1]).collect();

    let pad = |(lo, hi): (f64, f64), step: f64| {
        let lo = ((lo - step) / step).floor() * step;
        let hi = ((hi + step) / step).ceil() * step;
        [lo.max(0.0), hi]
    };

    let x = min_max(&xs).map(|b| pad(b, 5.0)).unwrap_or([0.0, 100.0]);
    let y = min_max(&ys).map(|b| pad(b, 10.0)).unwrap_or([0.0, 180.0]);
    (x, y)
}

/// Whole numbers without decimals, anything else with one.
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

/// `(age, seconds)` to `(age, minutes)` for plotting.
pub fn to_minutes(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points.iter().map(|&(age, secs)| (age, secs / 60.0)).collect()
}
