//! Métriques des polices Helvetica standard (chasses AFM, unités de 1/1000 em)

use serde::Serialize;

/// Police de la mise en page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Regular,
    Bold,
}

/// Hauteur de jambage supérieur (Helvetica)
pub const ASCENT: f64 = 0.718;
/// Interligne relatif
pub const LINE_HEIGHT: f64 = 1.2;

// Caractères 0x20..=0x7E
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match c {
        ' '..='~' => table[c as usize - 0x20],
        // Lettres accentuées : chasse de la lettre de base
        'à' | 'â' | 'ä' => table[('a' as usize) - 0x20],
        'é' | 'è' | 'ê' | 'ë' => table[('e' as usize) - 0x20],
        'î' | 'ï' => table[('i' as usize) - 0x20],
        'ô' | 'ö' => table[('o' as usize) - 0x20],
        'ù' | 'û' | 'ü' => table[('u' as usize) - 0x20],
        'ç' => table[('c' as usize) - 0x20],
        '’' => table[('\'' as usize) - 0x20],
        _ => 556,
    }
}

/// Largeur d'un texte en points
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, font))).sum();
    f64::from(units) * size / 1000.0
}

/// Découpe un texte en lignes d'au plus `max_width` points
///
/// Les sauts de ligne explicites sont conservés ; un mot plus large que la
/// ligne reste seul sur sa ligne.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        // "DP1" = 722 + 667 + 556 en Helvetica
        assert!((text_width("DP1", Font::Regular, 10.0) - 19.45).abs() < 1e-9);
        assert!(text_width("Sommaire", Font::Bold, 12.0) > text_width("Sommaire", Font::Regular, 12.0));
        assert_eq!(text_width("é", Font::Regular, 10.0), text_width("e", Font::Regular, 10.0));
    }

    #[test]
    fn test_wrap() {
        let lines = wrap_text("aaa bbb ccc", Font::Regular, 10.0, 40.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);

        let lines = wrap_text("ligne 1\n\nligne 3", Font::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["ligne 1", "", "ligne 3"]);
    }
}
