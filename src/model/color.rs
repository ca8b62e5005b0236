/// Number of entries in the project color palette
pub const COLOR_COUNT: usize = 12;

/// Palette index used when a stored color can't be resolved
pub const DEFAULT_COLOR_INDEX: usize = 0;

/// Hex form of the default palette entry
pub const DEFAULT_COLOR: &str = "#BDE876";

/// The project palette, in legacy index order
pub const PALETTE: [&str; COLOR_COUNT] = [
    "#BDE876", // green
    "#FF8581", // red
    "#FFC472", // orange
    "#FAED75", // yellow
    "#A8C9E5", // light blue
    "#D2B8A4", // dark grey
    "#E3A8E5", // purple
    "#DDDDDD", // light grey
    "#FC896F", // salmon
    "#FFCC00", // dark orange
    "#74E8D4", // teal
    "#3CD6FC", // aqua
];

/// Older hex values still found on accounts, mapped to their palette slot
const ALIASES: [(&str, usize); 2] = [("#999999", 5), ("#FC603C", 8)];

/// Hex string for a palette index; out-of-range indices get the default.
pub fn hex_from_index(index: usize) -> &'static str {
    PALETTE.get(index).copied().unwrap_or(DEFAULT_COLOR)
}

/// Palette index for a hex string (case-insensitive); unknown colors map to
/// the default index.
pub fn index_from_hex(hex: &str) -> usize {
    let upper = hex.trim().to_ascii_uppercase();
    PALETTE
        .iter()
        .position(|c| *c == upper)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == upper)
                .map(|(_, idx)| *idx)
        })
        .unwrap_or(DEFAULT_COLOR_INDEX)
}

/// Resolve a stored color in either form (`#RRGGBB` or a legacy index) to a
/// palette index.
pub fn resolve_index(stored: &str) -> usize {
    let stored = stored.trim();
    if stored.starts_with('#') {
        index_from_hex(stored)
    } else {
        stored.parse::<usize>().unwrap_or(DEFAULT_COLOR_INDEX)
    }
}

/// Resolve a stored color in either form to a hex string.
///
/// Hex values are passed through untouched so custom colors still render.
pub fn resolve_hex(stored: &str) -> String {
    let stored = stored.trim();
    if stored.starts_with('#') {
        stored.to_string()
    } else {
        hex_from_index(resolve_index(stored)).to_string()
    }
}
