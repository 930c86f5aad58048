/// Converts earned points into a percentage on a 0 to 100 scale.
pub fn percentage(total_points: f64, max_points: i32) -> f64 {
    if max_points <= 0 {
        return 0.0;
    }
    (total_points / max_points as f64 * 100.0).clamp(0.0, 100.0)
}

/// Maps a percentage onto the letter scale used on transcripts.
pub fn letter_grade(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 93.0 => "A",
        p if p >= 90.0 => "A-",
        p if p >= 87.0 => "B+",
        p if p >= 83.0 => "B",
        p if p >= 80.0 => "B-",
        p if p >= 77.0 => "C+",
        p if p >= 73.0 => "C",
        p if p >= 70.0 => "C-",
        p if p >= 67.0 => "D+",
        p if p >= 63.0 => "D",
        p if p >= 60.0 => "D-",
        _ => "F",
    }
}
