//! Style registry: preset roles per block kind.
//!
//! Text and image presets live in disjoint namespaces. A role that matches
//! no preset of its kind is classified as custom; classification never
//! touches the stored role.

use crate::model::BlockKind;

/// Reserved picker id meaning "role is not one of the presets"
pub const CUSTOM_STYLE_ID: &str = "custom";

/// A preset role and its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleEntry {
    pub id: &'static str,
    pub label: &'static str,
}

const fn entry(id: &'static str, label: &'static str) -> StyleEntry {
    StyleEntry { id, label }
}

/// Sentinel entry shown last in every picker
pub const CUSTOM_STYLE: StyleEntry = entry(CUSTOM_STYLE_ID, "Custom…");

pub const TEXT_STYLES: &[StyleEntry] = &[
    entry("haggadah_main_hebrew", "Haggadah – Main Hebrew (HE)"),
    entry("haggadah_translation_en", "Haggadah – Translation (EN)"),
    entry("commentary_en", "Commentary (EN)"),
    entry("commentary_he", "Commentary (HE)"),
    entry("footnote_en", "Footnote (EN)"),
    entry("footnote_he", "Footnote (HE)"),
    entry("divrei_torah_callout", "Divrei Torah Callout"),
];

pub const IMAGE_STYLES: &[StyleEntry] = &[
    entry("archaeology_fig", "Archaeology Figure"),
    entry("photo_illustration", "Photo Illustration"),
];

/// How a role is classified for a picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleChoice {
    Preset(&'static StyleEntry),
    Custom,
}

impl StyleChoice {
    /// Picker id: the preset id or `"custom"`
    pub fn id(&self) -> &'static str {
        match self {
            StyleChoice::Preset(entry) => entry.id,
            StyleChoice::Custom => CUSTOM_STYLE_ID,
        }
    }
}

/// Ordered presets for a block kind (sentinel excluded)
pub fn styles_for(kind: BlockKind) -> &'static [StyleEntry] {
    match kind {
        BlockKind::Text => TEXT_STYLES,
        BlockKind::Image => IMAGE_STYLES,
    }
}

/// Presets followed by the custom sentinel, in picker order
pub fn picker_entries(kind: BlockKind) -> impl Iterator<Item = &'static StyleEntry> {
    styles_for(kind).iter().chain(std::iter::once(&CUSTOM_STYLE))
}

/// Classify `role` against the presets of `kind`. Exact match only.
pub fn resolve_style(kind: BlockKind, role: &str) -> StyleChoice {
    styles_for(kind)
        .iter()
        .find(|entry| entry.id == role)
        .map_or(StyleChoice::Custom, StyleChoice::Preset)
}

/// Role given to freshly added blocks
pub fn default_role(kind: BlockKind) -> &'static str {
    styles_for(kind)[0].id
}

/// Label for display: preset label, or the raw role when custom
pub fn label_for(kind: BlockKind, role: &str) -> String {
    match resolve_style(kind, role) {
        StyleChoice::Preset(entry) => entry.label.to_owned(),
        StyleChoice::Custom if role.is_empty() => "(no style)".to_owned(),
        StyleChoice::Custom => role.to_owned(),
    }
}
