use crate::error::ClientError;
use crate::model::{TAG_NAME_MAX, Tag};

/// Trim a tag name and reject names the server would refuse.
pub fn validate_tag_name(raw: &str) -> Result<String, ClientError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ClientError::validation("Tag name is required."));
    }
    if name.chars().count() > TAG_NAME_MAX {
        return Err(ClientError::validation(format!(
            "Tag name must be at most {TAG_NAME_MAX} characters."
        )));
    }
    Ok(name.to_string())
}

/// The server stores colors as `#RRGGBB`.
pub fn validate_tag_color(raw: &str) -> Result<String, ClientError> {
    let color = raw.trim();
    if is_hex_color(color) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(ClientError::validation(format!(
            "Tag color must look like #RRGGBB (got {color:?})."
        )))
    }
}

pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a CSS hex color (`#rgb` or `#rrggbb`).
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize, width: usize| {
        let part = &hex[i * width..(i + 1) * width];
        let v = u8::from_str_radix(part, 16).ok()?;
        Some(if width == 1 { v * 17 } else { v })
    };
    match hex.len() {
        3 => Some((channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
        6 => Some((channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
        _ => None,
    }
}

/// Color used to paint a tag chip: the tag's own color, or a palette entry
/// picked from the name when the stored color is not a hex value.
pub fn chip_rgb(tag: &Tag) -> (u8, u8, u8) {
    parse_hex_color(&tag.color).unwrap_or_else(|| color_for_name(&tag.name))
}

/// djb2-style hash so fallback colors are stable between runs.
pub fn hash_name(name: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in name.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

pub fn color_for_name(name: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (96, 165, 250),
        (148, 163, 184),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (255, 214, 165),
        (186, 225, 255),
    ];
    PALETTE[(hash_name(name) as usize) % PALETTE.len()]
}
