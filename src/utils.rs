/// Parses a numeric text field, keeping `fallback` for blank or malformed input.
pub fn parse_f64_input(value: &str, fallback: f64) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return fallback;
    }
    trimmed
        .trim_end_matches('%')
        .trim_end_matches('°')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .unwrap_or(fallback)
}

/// Parses a checkbox-like text field ("true", "1", "on", ...).
pub fn parse_bool_input(value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => true,
        "false" | "0" | "off" | "no" => false,
        _ => fallback,
    }
}

/// Clamps `value` into `[min, max]`, substituting `fallback` for NaN and infinities.
pub fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Formats seconds as `HH:MM:SS:FF` for the given frame rate.
pub fn format_timecode(seconds: f64, fps: f64) -> String {
    let fps = fps.max(1.0);
    let fps_i = fps.round().max(1.0) as u64;
    let total_frames = (seconds * fps).round().max(0.0) as u64;
    let frames = total_frames % fps_i;
    let total_seconds = total_frames / fps_i;
    let secs = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, secs, frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_fallback_for_garbage() {
        assert_eq!(parse_f64_input("", 3.0), 3.0);
        assert_eq!(parse_f64_input("abc", 3.0), 3.0);
        assert_eq!(parse_f64_input("NaN", 3.0), 3.0);
        assert_eq!(parse_f64_input(" 150% ", 3.0), 150.0);
        assert_eq!(parse_f64_input("-10°", 0.0), -10.0);
    }

    #[test]
    fn clamp_finite_replaces_nan() {
        assert_eq!(clamp_finite(f64::NAN, 0.0, 1.0, 0.5), 0.5);
        assert_eq!(clamp_finite(2.0, 0.0, 1.0, 0.5), 1.0);
    }

    #[test]
    fn timecode_uses_frame_rate() {
        assert_eq!(format_timecode(0.0, 30.0), "00:00:00:00");
        assert_eq!(format_timecode(61.5, 30.0), "00:01:01:15");
        assert_eq!(format_timecode(3600.0, 24.0), "01:00:00:00");
    }
}
