//! Annotations vectorielles (SVG) en coordonnées pixel

use std::fmt::Write;

/// Rectangle de panneau en pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

const FONT_FAMILY: &str = "Noto Sans, Arial, Helvetica, sans-serif";

fn open(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )
}

/// Échappe les caractères spéciaux XML
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cercle de localisation en pointillés rouges
pub fn svg_dotted_circle(width: u32, height: u32, cx: i64, cy: i64, radius: i64) -> String {
    format!(
        r##"{}<circle cx="{}" cy="{}" r="{}" fill="none" stroke="#DC2626" stroke-width="4" stroke-dasharray="10 8"/></svg>"##,
        open(width, height),
        cx,
        cy,
        radius
    )
}

/// Point central (marqueur orange)
pub fn svg_center_point(width: u32, height: u32, cx: i64, cy: i64, radius: i64) -> String {
    format!(
        r##"{}<circle cx="{}" cy="{}" r="{}" fill="#F59E0B" stroke="#B45309" stroke-width="2"/></svg>"##,
        open(width, height),
        cx,
        cy,
        radius
    )
}

/// Flèche du nord : triangle de hauteur `size`, lettre N au-dessus de la pointe
pub fn svg_north_arrow(width: u32, height: u32, size: i64, x: i64, y: i64) -> String {
    let arrow_width = (size as f64 * 0.6).round();
    let tip_x = x as f64 + arrow_width / 2.0;
    let base_y = y + size;
    let right_x = x as f64 + arrow_width;
    let font_size = (size as f64 * 0.35).round();

    format!(
        r##"{open}<polygon points="{tip_x},{y} {right_x},{base_y} {x},{base_y}" fill="#111827"/><text x="{tip_x}" y="{ty}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="{font_size}" fill="#111827" font-weight="700">N</text></svg>"##,
        open = open(width, height),
        ty = y - 6,
    )
}

/// Rectangles de panneaux photovoltaïques
pub fn svg_panel_rects(width: u32, height: u32, panels: &[PanelRect]) -> String {
    let mut svg = open(width, height);
    for p in panels {
        let _ = write!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#1F2937" fill-opacity="0.85" stroke="#93C5FD" stroke-width="2"/>"##,
            p.x, p.y, p.width, p.height
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Cartouche de légende : pastille panneau + libellé
pub fn svg_legend_box(width: u32, height: u32, x: i64, y: i64, w: i64, h: i64, label: &str) -> String {
    let swatch = (h - 12).max(4);
    format!(
        r##"{open}<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="#FFFFFF" fill-opacity="0.92" stroke="#111827" stroke-width="1.5"/><rect x="{sx}" y="{sy}" width="{sw}" height="{swatch}" fill="#1F2937" stroke="#93C5FD" stroke-width="1.5"/><text x="{tx}" y="{ty}" font-family="{FONT_FAMILY}" font-size="14" fill="#111827">{label}</text></svg>"##,
        open = open(width, height),
        sx = x + 6,
        sy = y + 6,
        sw = (swatch as f64 * 1.6).round() as i64,
        tx = x + 6 + (swatch as f64 * 1.6).round() as i64 + 8,
        ty = y + h / 2 + 5,
        label = escape_xml(label),
    )
}

/// Encadré d'information : titre en gras puis une ligne par élément
#[allow(clippy::too_many_arguments)]
pub fn svg_info_box(
    width: u32,
    height: u32,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
    title: &str,
    lines: &[&str],
) -> String {
    let mut svg = open(width, height);
    let _ = write!(
        svg,
        r##"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="#FFFFFF" fill-opacity="0.92" stroke="#111827" stroke-width="1.5"/><text x="{tx}" y="{ty}" font-family="{FONT_FAMILY}" font-size="15" font-weight="700" fill="#111827">{title}</text>"##,
        tx = x + 10,
        ty = y + 22,
        title = escape_xml(title),
    );
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="13" fill="#374151">{}</text>"##,
            x + 10,
            y + 44 + i as i64 * 18,
            escape_xml(line)
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Contour de la maison (tirets blancs sur fond semi-transparent)
pub fn svg_house_outline(width: u32, height: u32, x: i64, y: i64, w: i64, h: i64) -> String {
    format!(
        r##"{}<rect x="{}" y="{}" width="{}" height="{}" fill="#FFFFFF" fill-opacity="0.12" stroke="#FFFFFF" stroke-width="3" stroke-dasharray="12 6"/></svg>"##,
        open(width, height),
        x,
        y,
        w,
        h
    )
}

/// Image de remplacement « Image indisponible »
pub fn placeholder_svg(width: u32, height: u32, label: &str) -> String {
    let cx = (width as f64 / 2.0).round() as i64;
    let cy = (height as f64 / 2.0).round() as i64;
    format!(
        r##"{open}<rect x="0" y="0" width="{width}" height="{height}" fill="#F3F4F6"/><rect x="18" y="18" width="{iw}" height="{ih}" fill="none" stroke="#9CA3AF" stroke-width="3"/><text x="{cx}" y="{t1}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="34" fill="#111827">Image indisponible</text><text x="{cx}" y="{t2}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="22" fill="#374151">{label}</text></svg>"##,
        open = open(width, height),
        iw = width.saturating_sub(36).max(1),
        ih = height.saturating_sub(36).max(1),
        t1 = cy - 10,
        t2 = cy + 34,
        label = escape_xml(label),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"A & B <"c'">"#), "A &amp; B &lt;&quot;c&apos;&quot;&gt;");
    }

    #[test]
    fn test_north_arrow_geometry() {
        let svg = svg_north_arrow(800, 600, 72, 722, 24);
        // largeur 43, pointe à x + 21.5
        assert!(svg.contains(r#"points="743.5,24 765,96 722,96""#));
        assert!(svg.contains(r#"y="18""#));
        assert!(svg.contains(r#"font-size="25""#));
    }

    #[test]
    fn test_placeholder_contains_label() {
        let svg = placeholder_svg(400, 300, "Plan <1/1000>");
        assert!(svg.contains("Image indisponible"));
        assert!(svg.contains("Plan &lt;1/1000&gt;"));
        assert!(svg.contains(r#"width="364""#));
    }

    #[test]
    fn test_panel_rects() {
        let svg = svg_panel_rects(100, 100, &[PanelRect::new(1.0, 2.0, 3.0, 4.0)]);
        assert!(svg.contains(r#"<rect x="1.0" y="2.0" width="3.0" height="4.0""#));
        assert!(svg.ends_with("</svg>"));
    }
}
