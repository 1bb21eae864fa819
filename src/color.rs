use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use mail_triage::data::model::{Priority, ResolutionStatus};

// ---------------------------------------------------------------------------
// Fixed colours for the known enum values
// ---------------------------------------------------------------------------

pub const HIGH: Color32 = Color32::from_rgb(0xff, 0x47, 0x57);
pub const MEDIUM: Color32 = Color32::from_rgb(0xff, 0xa7, 0x26);
pub const LOW: Color32 = Color32::from_rgb(0x66, 0xbb, 0x6a);

pub const COMPLETED: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
pub const IN_PROGRESS: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
pub const PENDING: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

pub fn priority_color(p: &Priority) -> Color32 {
    match p {
        Priority::High => HIGH,
        Priority::Medium => MEDIUM,
        Priority::Low => LOW,
        Priority::Other(_) => Color32::GRAY,
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Status colours: fixed for the known states, generated for the rest
// ---------------------------------------------------------------------------

/// Colour per resolution status present in the table. Unknown statuses get
/// distinct generated hues.
#[derive(Debug, Clone)]
pub struct StatusColors {
    extra: BTreeMap<String, Color32>,
}

impl StatusColors {
    pub fn new(statuses: &BTreeSet<ResolutionStatus>) -> Self {
        let unknown: Vec<&str> = statuses
            .iter()
            .filter_map(|s| match s {
                ResolutionStatus::Other(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let palette = generate_palette(unknown.len());
        let extra = unknown
            .into_iter()
            .zip(palette)
            .map(|(s, c)| (s.to_string(), c))
            .collect();
        StatusColors { extra }
    }

    pub fn color_for(&self, status: &ResolutionStatus) -> Color32 {
        match status {
            ResolutionStatus::Completed => COMPLETED,
            ResolutionStatus::InProgress => IN_PROGRESS,
            ResolutionStatus::Pending => PENDING,
            ResolutionStatus::Other(text) => {
                self.extra.get(text).copied().unwrap_or(Color32::GRAY)
            }
        }
    }

    /// Same lookup by display label, as used by the aggregate maps.
    pub fn color_for_label(&self, label: &str) -> Color32 {
        self.color_for(&ResolutionStatus::parse(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        let unique: BTreeSet<[u8; 4]> = p.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn known_statuses_keep_fixed_colours() {
        let statuses: BTreeSet<ResolutionStatus> = [
            ResolutionStatus::Completed,
            ResolutionStatus::parse("Escalated"),
        ]
        .into();
        let colors = StatusColors::new(&statuses);
        assert_eq!(colors.color_for(&ResolutionStatus::Completed), COMPLETED);
        assert_eq!(colors.color_for_label("In Progress"), IN_PROGRESS);
        assert_ne!(colors.color_for_label("Escalated"), Color32::GRAY);
        assert_eq!(colors.color_for_label("Unheard of"), Color32::GRAY);
    }
}
