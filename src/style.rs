//! Style parser — extracts stroke color and width from a path
//! element's `style` attribute.

use crate::model::StrokeStyle;

/// Parse a CSS-like `style` attribute into a [`StrokeStyle`].
///
/// The attribute is a `;`-separated list of `key:value` declarations;
/// only `stroke` and `stroke-width` are kept. Declarations without a
/// colon are skipped. No validation of the values happens here —
/// malformed colors and widths are resolved to defaults by the curve
/// encoder.
pub fn parse_style(style_attr: Option<&str>) -> StrokeStyle {
    let attr = match style_attr {
        Some(a) => a,
        None => return StrokeStyle::default(),
    };

    let mut style = StrokeStyle::default();
    for decl in attr.split(';') {
        let Some((key, value)) = decl.split_once(':') else {
            continue;
        };
        match key.trim() {
            "stroke" => style.color = Some(value.trim().to_string()),
            "stroke-width" => style.width = Some(value.trim().to_string()),
            _ => {}
        }
    }
    style
}
