//! Static width tables for the two PDF base fonts the resume uses.
//!
//! Widths are in em units (1/1000 of the AFM glyph widths) and cover ASCII
//! 0x20..=0x7E. Index = (char as usize) - 32. Anything else measures as
//! `average_char_width`, which is close enough for Latin-1 letters.

/// The built-in Type 1 fonts referenced by the PDF renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseFont {
    Helvetica,
    HelveticaBold,
}

impl BaseFont {
    /// PostScript name written into the font dictionary.
    pub fn postscript_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Name of the font in the page resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            BaseFont::Helvetica => "F1",
            BaseFont::HelveticaBold => "F2",
        }
    }

    pub fn metrics(&self) -> &'static FontMetricTable {
        match self {
            BaseFont::Helvetica => &HELVETICA_TABLE,
            BaseFont::HelveticaBold => &HELVETICA_BOLD_TABLE,
        }
    }
}

pub struct FontMetricTable {
    widths: [f32; 95],
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of `s` in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in points at `font_size_pt`.
    pub fn width_pt(&self, s: &str, font_size_pt: f32) -> f32 {
        self.measure_str(s) * font_size_pt
    }

    /// Greedy word wrap of `text` into lines no wider than `max_width_pt`.
    ///
    /// Explicit newlines always break. A word wider than a whole line is split
    /// between characters. Blank input yields a single empty line.
    pub fn wrap(&self, text: &str, font_size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let max_width = max_width_pt / font_size_pt;
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in paragraph.split_whitespace() {
                let word_w = self.measure_str(word);
                let space_w = if current.is_empty() { 0.0 } else { self.space_width };

                if current_width + space_w + word_w <= max_width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width += space_w + word_w;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }

                if word_w <= max_width {
                    current.push_str(word);
                    current_width = word_w;
                } else {
                    for c in word.chars() {
                        let char_w = self.measure_str(c.encode_utf8(&mut [0; 4]));
                        if current_width + char_w > max_width && !current.is_empty() {
                            lines.push(std::mem::take(&mut current));
                            current_width = 0.0;
                        }
                        current.push(c);
                        current_width += char_w;
                    }
                }
            }

            lines.push(current);
        }

        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

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
