use foundation::color::Color;

pub const SCORE_DARK_GREEN: Color = Color::rgb(0x04, 0x78, 0x57);
pub const SCORE_GREEN: Color = Color::rgb(0x10, 0xb9, 0x81);
pub const SCORE_YELLOW: Color = Color::rgb(0xf5, 0x9e, 0x0b);
pub const SCORE_ORANGE: Color = Color::rgb(0xf9, 0x73, 0x16);
pub const SCORE_RED: Color = Color::rgb(0xef, 0x44, 0x44);
pub const SCORE_GRAY: Color = Color::rgb(0x9c, 0xa3, 0xaf);

/// Deterministic score -> marker color step function.
///
/// Thresholds are inclusive lower bounds: 85, 75, 65, 55. Scores without a
/// value render gray.
pub fn score_color(score: Option<i32>) -> Color {
    match score {
        Some(s) if s >= 85 => SCORE_DARK_GREEN,
        Some(s) if s >= 75 => SCORE_GREEN,
        Some(s) if s >= 65 => SCORE_YELLOW,
        Some(s) if s >= 55 => SCORE_ORANGE,
        Some(_) => SCORE_RED,
        None => SCORE_GRAY,
    }
}

/// Marker label text: the score, or `"?"` when none is known.
pub fn score_label(score: Option<i32>) -> String {
    match score {
        Some(s) => s.to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_boundaries_are_exact() {
        assert_eq!(score_color(Some(85)), SCORE_DARK_GREEN);
        assert_eq!(score_color(Some(84)), SCORE_GREEN);
        assert_eq!(score_color(Some(75)), SCORE_GREEN);
        assert_eq!(score_color(Some(74)), SCORE_YELLOW);
        assert_eq!(score_color(Some(65)), SCORE_YELLOW);
        assert_eq!(score_color(Some(64)), SCORE_ORANGE);
        assert_eq!(score_color(Some(55)), SCORE_ORANGE);
        assert_eq!(score_color(Some(54)), SCORE_RED);
        assert_eq!(score_color(Some(0)), SCORE_RED);
        assert_eq!(score_color(None), SCORE_GRAY);
    }

    #[test]
    fn missing_scores_label_as_question_mark() {
        assert_eq!(score_label(Some(90)), "90");
        assert_eq!(score_label(None), "?");
    }
}
