//! Text measurement and wrapping. Plotters cannot measure text before drawing,
//! so widths are estimated from the character count.

/// Approximate rendered width of `text` in pixels, at 0.6 em per character.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    // Integer tenths keep exact multiples from rounding up a pixel.
    (text.chars().count() as u32 * font_px * 6).div_ceil(10)
}

/// Break `text` into lines no wider than `max_px`, splitting on the given
/// separator first and on characters only when a single piece is too long.
pub fn wrap_to_width(text: &str, sep: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let fits = |s: &str| estimate_text_width_px(s, font_px) <= max_px;
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for piece in text.split(sep).filter(|p| !p.trim().is_empty()) {
        let candidate = if cur.is_empty() {
            piece.trim_start().to_string()
        } else {
            format!("{cur}{sep}{piece}")
        };
        if fits(&candidate) {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        let piece = piece.trim_start();
        if fits(piece) {
            cur = piece.to_string();
            continue;
        }
        // Hard break an over-long piece.
        for ch in piece.chars() {
            cur.push(ch);
            if !fits(&cur) && cur.chars().count() > 1 {
                cur.pop();
                lines.push(std::mem::take(&mut cur));
                cur.push(ch);
            }
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Word wrap on spaces.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    wrap_to_width(text, " ", font_px, max_px)
}
