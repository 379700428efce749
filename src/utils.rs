use crossterm::style::Color;
use std::hash::{Hash, Hasher};

/// Fixed palette of visually distinct pod prefix colors. Severity colors
/// (red, yellow, cyan, white) are left out so a prefix never reads as a
/// log level.
const POD_PALETTE: [Color; 8] = [
    Color::Green,
    Color::Blue,
    Color::Magenta,
    Color::Grey,
    Color::AnsiValue(10), // bright green
    Color::AnsiValue(12), // bright blue
    Color::AnsiValue(13), // bright magenta
    Color::AnsiValue(14), // bright cyan
];

/// Deterministic color for a pod name: same name, same color, within one
/// run and across runs. Collisions across names are expected.
pub fn color_for(pod_name: &str) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    pod_name.hash(&mut hasher);
    let hash = hasher.finish() as u32;
    POD_PALETTE[(hash % POD_PALETTE.len() as u32) as usize]
}
