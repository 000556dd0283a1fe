//! Color handling: the default tab10 cycle and user-supplied color lists.

use crate::error::FleurError;
use plotters::prelude::*;

/// Matplotlib's tab10 cycle, the default series colors.
const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // blue   (#1f77b4)
    RGBColor(255, 127, 14),  // orange (#ff7f0e)
    RGBColor(44, 160, 44),   // green  (#2ca02c)
    RGBColor(214, 39, 40),   // red    (#d62728)
    RGBColor(148, 103, 189), // purple (#9467bd)
    RGBColor(140, 86, 75),   // brown  (#8c564b)
    RGBColor(227, 119, 194), // pink   (#e377c2)
    RGBColor(127, 127, 127), // gray   (#7f7f7f)
    RGBColor(188, 189, 34),  // olive  (#bcbd22)
    RGBColor(23, 190, 207),  // cyan   (#17becf)
];

const TAB10_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

#[inline]
pub fn tab10_color(idx: usize) -> RGBColor {
    TAB10[idx % TAB10.len()]
}

/// Parse `#rrggbb`, `#rgb`, `tab:<name>`, or a basic color name.
pub fn parse_color(spec: &str) -> Result<RGBColor, FleurError> {
    let s = spec.trim().to_ascii_lowercase();
    let invalid = || FleurError::InvalidColor(spec.to_string());
    if let Some(hex) = s.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let digits: Vec<u8> = match hex.len() {
            6 => (0..3)
                .map(|i| u8::from_str_radix(&hex[2 * i..2 * i + 2], 16))
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?,
            3 => hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        return Ok(RGBColor(digits[0], digits[1], digits[2]));
    }
    if let Some(name) = s.strip_prefix("tab:") {
        let name = if name == "grey" { "gray" } else { name };
        return TAB10_NAMES
            .iter()
            .position(|n| *n == name)
            .map(tab10_color)
            .ok_or_else(invalid);
    }
    let rgb = match s.as_str() {
        "black" | "k" => (0, 0, 0),
        "white" | "w" => (255, 255, 255),
        "red" | "r" => (255, 0, 0),
        "green" | "g" => (0, 128, 0),
        "blue" | "b" => (0, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "olive" => (128, 128, 0),
        "cyan" | "c" => (0, 255, 255),
        "magenta" | "m" => (255, 0, 255),
        "yellow" | "y" => (255, 255, 0),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        _ => return Err(invalid()),
    };
    Ok(RGBColor(rgb.0, rgb.1, rgb.2))
}

/// The first `n` colors: from `colors` when given (which must hold at least
/// `n` entries), otherwise from the tab10 cycle.
pub fn first_n_colors(colors: Option<&[String]>, n: usize) -> Result<Vec<RGBColor>, FleurError> {
    match colors {
        None => Ok((0..n).map(tab10_color).collect()),
        Some(list) if list.len() < n => Err(FleurError::TooFewColors {
            needed: n,
            given: list.len(),
        }),
        Some(list) => list.iter().take(n).map(|c| parse_color(c)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_names() {
        assert_eq!(parse_color("#1f77b4").unwrap(), RGBColor(31, 119, 180));
        assert_eq!(parse_color("#fff").unwrap(), RGBColor(255, 255, 255));
        assert_eq!(parse_color("tab:orange").unwrap(), tab10_color(1));
        assert_eq!(parse_color("Navy").unwrap(), RGBColor(0, 0, 128));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gg0000").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn non_ascii_hex_is_an_error() {
        // Six bytes but only five chars; byte slicing would split 'é'.
        assert!(matches!(parse_color("#aéaaa"), Err(FleurError::InvalidColor(_))));
        assert!(matches!(parse_color("#ééé"), Err(FleurError::InvalidColor(_))));
        assert!(parse_color("tab:bleu\u{301}").is_err());
    }

    #[test]
    fn default_cycle_wraps() {
        let c = first_n_colors(None, 12).unwrap();
        assert_eq!(c[10], c[0]);
    }

    #[test]
    fn short_list_is_an_error() {
        let given = vec!["red".to_string(), "blue".to_string()];
        let err = first_n_colors(Some(&given), 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`colors` argument must have at least 3 elements, not 2"
        );
        assert_eq!(first_n_colors(Some(&given), 1).unwrap(), vec![RGBColor(255, 0, 0)]);
    }
}
