//! Static font-metric tables for the PDF builtin fonts used in reports.
//!
//! Character widths are in em units (relative to font size), taken from the standard
//! Helvetica AFM files. Tables cover ASCII 0x20..=0x7E (95 printable characters);
//! index = (char as usize) - 32. Report text is folded to ASCII before layout.

/// Builtin fonts used by the report renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFont {
    Helvetica,
    HelveticaBold,
}

pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Greedy word wrap of `text` to `max_width_em`.
    ///
    /// Explicit newlines start a new line (blank lines are kept). Words wider than a full
    /// line are broken at character boundaries.
    pub fn wrap(&self, text: &str, max_width_em: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            self.wrap_paragraph(paragraph, max_width_em, &mut lines);
        }
        lines
    }

    fn wrap_paragraph(&self, paragraph: &str, max_width: f32, lines: &mut Vec<String>) {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = self.measure_str(word);

            if word_w > max_width {
                // Flush, then hard-break the long word.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                for c in word.chars() {
                    let w = self.char_width(c);
                    if current_width + w > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += w;
                }
                continue;
            }

            let space_w = if current.is_empty() { 0.0 } else { self.space_width };
            if !current.is_empty() && current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        lines.push(current);
    }
}

/// Helvetica.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Helvetica-Bold.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Returns the static metric table for a font.
pub fn get_metrics(font: ReportFont) -> &'static FontMetricTable {
    match font {
        ReportFont::Helvetica => &HELVETICA_TABLE,
        ReportFont::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(ReportFont::Helvetica).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = get_metrics(ReportFont::Helvetica).measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_bold_is_wider() {
        let text = "Architected distributed caching layer";
        assert!(
            get_metrics(ReportFont::HelveticaBold).measure_str(text)
                > get_metrics(ReportFont::Helvetica).measure_str(text)
        );
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = get_metrics(ReportFont::Helvetica).wrap("Hello world", 40.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let metrics = get_metrics(ReportFont::Helvetica);
        let text = "word ".repeat(30);
        let lines = metrics.wrap(text.trim(), 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.measure_str(line) <= 10.0 + 1e-4, "line too wide: {line}");
            assert!(!line.starts_with(' ') && !line.ends_with(' '));
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text.trim());
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines_and_blank_lines() {
        let lines = get_metrics(ReportFont::Helvetica).wrap("a\n\nb", 40.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let metrics = get_metrics(ReportFont::Helvetica);
        let url = "https://example.com/".to_string() + &"x".repeat(200);
        let lines = metrics.wrap(&url, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url);
        for line in &lines {
            assert!(metrics.measure_str(line) <= 20.0 + 1e-4);
        }
    }
}
