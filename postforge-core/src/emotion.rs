//! Emotion Color Mapper

pub const DEFAULT_TINT: &str = "#FFFFFF";

pub const PALETTE: [(&str, &str); 6] = [
    ("joy", "#FFD700"),
    ("trust", "#1E90FF"),
    ("anticipation", "#FF8C00"),
    ("luxury", "#8B5CF6"),
    ("calm", "#87CEEB"),
    ("festivity", "#FF4500"),
];

/// Tint color for an emotion tag. Lookup is case-insensitive; anything
/// outside the palette gets [`DEFAULT_TINT`].
pub fn emotion_color(emotion: Option<&str>) -> &'static str {
    let Some(emotion) = emotion else {
        return DEFAULT_TINT;
    };
    let emotion = emotion.to_lowercase();
    PALETTE
        .iter()
        .find(|(name, _)| *name == emotion)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_TINT)
}

/// Parse `#rgb` or `#rrggbb` into channel bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => {
            let mut out = [0u8; 3];
            for (i, chunk) in out.iter_mut().enumerate() {
                *chunk = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(out)
        }
        _ => None,
    }
}
