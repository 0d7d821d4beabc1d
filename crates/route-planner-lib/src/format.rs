//! Human-readable text for distances and durations

/// Format a distance in meters, e.g. `850 m` or `12.3 km`
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters.max(0.0).round())
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format a duration in seconds, e.g. `1 min`, `25 mins`, `1 hour 5 mins`, `2 days 3 hours`
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        join_units(days, "day", hours, "hour")
    } else if hours > 0 {
        join_units(hours, "hour", minutes, "min")
    } else {
        plural(minutes.max(1), "min")
    }
}

fn join_units(major: u64, major_unit: &str, minor: u64, minor_unit: &str) -> String {
    if minor == 0 {
        plural(major, major_unit)
    } else {
        format!("{} {}", plural(major, major_unit), plural(minor, minor_unit))
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(849.6), "850 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(12_345.0), "12.3 km");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(10.0), "1 min");
        assert_eq!(format_duration(25.0 * 60.0), "25 mins");
        assert_eq!(format_duration(3600.0), "1 hour");
        assert_eq!(format_duration(3900.0), "1 hour 5 mins");
        assert_eq!(format_duration(2.0 * 86_400.0 + 3.0 * 3600.0), "2 days 3 hours");
    }
}
