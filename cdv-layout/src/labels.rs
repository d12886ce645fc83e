//! Vertical label de-overlap for node labels.

/// Minimum vertical distance between two labels on the same side.
pub const MIN_LABEL_SPACING: f64 = 14.0;

/// Labels displaced further than this get a dashed leader line to their node.
pub const LEADER_THRESHOLD: f64 = 5.0;

/// Shorten `name` to at most `max` characters, ending in "..." when cut.
pub fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Spread `ys` (label centres) so neighbours are at least `spacing` apart.
///
/// A downward pass pushes each label below its predecessor, then an upward
/// pass pulls labels back above their successor. Returns adjusted positions
/// in the input order.
pub fn spread(ys: &[f64], spacing: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..ys.len()).collect();
    order.sort_by(|&a, &b| ys[a].total_cmp(&ys[b]));
    let mut sorted: Vec<f64> = order.iter().map(|&i| ys[i]).collect();

    for i in 1..sorted.len() {
        if sorted[i - 1] + spacing > sorted[i] {
            sorted[i] = sorted[i - 1] + spacing;
        }
    }
    for i in (0..sorted.len().saturating_sub(1)).rev() {
        if sorted[i] + spacing > sorted[i + 1] {
            sorted[i] = sorted[i + 1] - spacing;
        }
    }

    let mut out = vec![0.0; ys.len()];
    for (slot, &i) in order.iter().enumerate() {
        out[i] = sorted[slot];
    }
    out
}

/// Whether a label moved from `original` to `placed` needs a leader line.
pub fn needs_leader(original: f64, placed: f64) -> bool {
    (placed - original).abs() > LEADER_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_names() {
        let name = "Attack on civilians by unidentified armed group";
        let short = truncate(name, 35);
        assert_eq!(short.chars().count(), 35);
        assert!(short.ends_with("..."));
        assert_eq!(truncate("Protests", 35), "Protests");
    }

    #[test]
    fn spread_separates_crowded_labels() {
        let out = spread(&[100.0, 102.0, 104.0], MIN_LABEL_SPACING);
        assert_eq!(out, vec![100.0, 114.0, 128.0]);
    }

    #[test]
    fn spread_preserves_input_order() {
        let out = spread(&[50.0, 10.0, 12.0], MIN_LABEL_SPACING);
        assert_eq!(out, vec![50.0, 10.0, 24.0]);
    }

    #[test]
    fn well_spaced_labels_do_not_move() {
        let ys = [0.0, 20.0, 40.0];
        assert_eq!(spread(&ys, MIN_LABEL_SPACING), ys.to_vec());
        assert!(!needs_leader(10.0, 14.0));
        assert!(needs_leader(10.0, 24.0));
    }
}
