//! Small text helpers for messages shown to knitters.

/// `base` for a count of one (or less), otherwise `plural` or `base` + "s".
pub fn pluralize(count: usize, base: &str, plural: Option<&str>) -> String {
    if count > 1 {
        plural.map_or_else(|| format!("{base}s"), str::to_string)
    } else {
        base.to_string()
    }
}
