//! Helpers for design-assistant inputs: palette colors and styling tips.

/// Vocabulary mined from styling tips: product types, materials, styles, colors
const TIP_VOCABULARY: &[&str] = &[
    // product types
    "sofa", "sectional", "armchair", "chair", "ottoman", "bench", "pouf", "coffee table",
    "side table", "console", "dining table", "bookshelf", "cabinet", "sideboard", "bed",
    "nightstand", "rug", "curtain", "cushion", "throw", "mirror", "wall art", "vase",
    "planter", "floor lamp", "table lamp", "pendant", "chandelier", "sconce",
    // materials
    "wood", "oak", "walnut", "teak", "rattan", "cane", "jute", "linen", "velvet", "leather",
    "boucle", "marble", "brass", "metal", "glass", "ceramic", "wool", "cotton",
    // styles
    "modern", "contemporary", "minimalist", "traditional", "rustic", "industrial",
    "scandinavian", "bohemian", "mid-century", "farmhouse", "coastal",
    // colors
    "white", "black", "grey", "gray", "beige", "cream", "navy", "blue", "green", "sage",
    "olive", "terracotta", "rust", "mustard", "gold", "pink", "blush", "brown", "tan",
];

/// Distinct vocabulary terms appearing in the tips, in vocabulary order
pub fn mine_styling_tips(tips: &[String]) -> Vec<String> {
    if tips.is_empty() {
        return Vec::new();
    }

    let text = tips.join(" ").to_lowercase();
    TIP_VOCABULARY
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&expanded[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Approximate color name for a hex string
///
/// Lightness and saturation decide white/black/grey; otherwise the dominant
/// RGB channel picks the hue. Not a perceptual model.
pub fn hex_to_color_name(hex: &str) -> Option<&'static str> {
    let (r, g, b) = parse_hex(hex)?;
    let (r, g, b) = (r as f64, g as f64, b as f64);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0 / 255.0;
    let saturation = (max - min) / 255.0;

    if lightness > 0.9 {
        return Some("white");
    }
    if lightness < 0.12 {
        return Some("black");
    }
    if saturation < 0.12 {
        if lightness > 0.75 {
            return Some("cream");
        }
        return Some("grey");
    }

    let name = if r >= g && r >= b {
        if g > r * 0.8 && b < r * 0.6 {
            "yellow"
        } else if b > r * 0.7 {
            if g < b * 0.7 {
                "purple"
            } else {
                "pink"
            }
        } else if g > r * 0.45 && lightness < 0.45 {
            "brown"
        } else if g > r * 0.45 {
            "orange"
        } else {
            "red"
        }
    } else if g >= r && g >= b {
        "green"
    } else if r > b * 0.7 {
        "purple"
    } else {
        "blue"
    };

    Some(name)
}

/// Color names for every parseable palette entry, deduplicated
pub fn palette_color_names(palette: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for hex in palette {
        match hex_to_color_name(hex) {
            Some(name) if !names.iter().any(|n| n == name) => names.push(name.to_string()),
            Some(_) => {}
            None => tracing::debug!(hex = %hex, "Skipping unparseable palette color"),
        }
    }
    names
}
