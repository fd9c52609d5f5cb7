//! Piecewise curves mapping raw metrics onto 0-100 component scores.
//!
//! Every curve is continuous at its inner breakpoints except the bottom transport band,
//! which uses a flat 3.33 slope.

pub fn green_space_score(ratio: f64) -> f64 {
    if ratio >= 1.5 {
        100.0
    } else if ratio >= 1.0 {
        80.0 + (ratio - 1.0) * 40.0
    } else if ratio >= 0.5 {
        40.0 + (ratio - 0.5) * 80.0
    } else {
        (ratio * 80.0).max(0.0)
    }
}

pub fn green_space_status(ratio: f64) -> &'static str {
    if ratio >= 1.5 {
        "Excellent"
    } else if ratio >= 1.0 {
        "Good"
    } else if ratio >= 0.5 {
        "Moderate"
    } else {
        "Poor"
    }
}

pub fn air_quality_score(aqi: f64) -> f64 {
    if aqi <= 50.0 {
        100.0
    } else if aqi <= 100.0 {
        80.0 - (aqi - 50.0) * 0.6
    } else if aqi <= 150.0 {
        50.0 - (aqi - 100.0) * 0.4
    } else if aqi <= 200.0 {
        30.0 - (aqi - 150.0) * 0.3
    } else {
        (15.0 - (aqi - 200.0) * 0.1).max(0.0)
    }
}

pub fn air_quality_status(aqi: f64) -> &'static str {
    if aqi <= 50.0 {
        "Good"
    } else if aqi <= 100.0 {
        "Moderate"
    } else if aqi <= 150.0 {
        "Unhealthy"
    } else {
        "Very Unhealthy"
    }
}

pub fn traffic_score(multiplier: f64, density_factor: f64) -> f64 {
    (100.0 - multiplier * 25.0 - density_factor * 15.0).max(0.0)
}

pub fn traffic_status(score: f64) -> &'static str {
    if score >= 80.0 {
        "Low Impact"
    } else if score >= 60.0 {
        "Moderate Impact"
    } else {
        "High Impact"
    }
}

pub fn land_use_score(built_up: f64) -> f64 {
    if built_up <= 60.0 {
        100.0 - built_up * 0.5
    } else if built_up <= 80.0 {
        70.0 - (built_up - 60.0) * 1.5
    } else {
        (40.0 - (built_up - 80.0) * 2.0).max(0.0)
    }
}

pub fn land_use_status(built_up: f64) -> &'static str {
    if built_up <= 60.0 {
        "Optimal"
    } else if built_up <= 80.0 {
        "Dense"
    } else {
        "Over-developed"
    }
}

pub fn transport_score(usage: f64) -> f64 {
    if usage >= 50.0 {
        100.0
    } else if usage >= 30.0 {
        80.0 + (usage - 30.0)
    } else if usage >= 15.0 {
        50.0 + (usage - 15.0) * 2.0
    } else {
        (usage * 3.33).max(0.0)
    }
}

pub fn transport_status(usage: f64) -> &'static str {
    if usage >= 50.0 {
        "Excellent"
    } else if usage >= 30.0 {
        "Good"
    } else if usage >= 15.0 {
        "Moderate"
    } else {
        "Poor"
    }
}
