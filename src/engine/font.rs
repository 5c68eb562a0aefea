//! 5x7 dot-matrix font.
//!
//! Each glyph is 7 rows of exactly 5 columns. A `#` in a row means "lit";
//! a space means "unlit". The table covers digits, the Latin capitals, the
//! Hungarian accented capitals, space, colon and apostrophe. Lookup is by
//! uppercase character; the caller normalizes case before calling.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::{GLYPH_HEIGHT, GLYPH_WIDTH, Glyph};

const PATTERNS: &[(char, [&str; GLYPH_HEIGHT])] = &[
    ('0', [" ### ", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('1', ["  #  ", " ##  ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "]),
    ('2', [" ### ", "#   #", "   # ", "  #  ", " #   ", "#    ", "#####"]),
    ('3', [" ### ", "#   #", "    #", "  ## ", "    #", "#   #", " ### "]),
    ('4', ["   # ", "  ## ", " # # ", "#  # ", "#####", "   # ", "   # "]),
    ('5', ["#####", "#    ", "#### ", "    #", "    #", "#   #", " ### "]),
    ('6', ["  ## ", " #   ", "#    ", "#### ", "#   #", "#   #", " ### "]),
    ('7', ["#####", "    #", "   # ", "  #  ", " #   ", " #   ", " #   "]),
    ('8', [" ### ", "#   #", "#   #", " ### ", "#   #", "#   #", " ### "]),
    ('9', [" ### ", "#   #", "#   #", " ####", "    #", "   # ", " ##  "]),
    ('A', [" ### ", "#   #", "#   #", "#####", "#   #", "#   #", "#   #"]),
    ('B', ["#### ", "#   #", "#   #", "#### ", "#   #", "#   #", "#### "]),
    ('C', [" ### ", "#   #", "#    ", "#    ", "#    ", "#   #", " ### "]),
    ('D', ["#### ", "#   #", "#   #", "#   #", "#   #", "#   #", "#### "]),
    ('E', ["#####", "#    ", "#    ", "#### ", "#    ", "#    ", "#####"]),
    ('F', ["#####", "#    ", "#    ", "#### ", "#    ", "#    ", "#    "]),
    ('G', [" ### ", "#   #", "#    ", "# ###", "#   #", "#   #", " ### "]),
    ('H', ["#   #", "#   #", "#   #", "#####", "#   #", "#   #", "#   #"]),
    ('I', [" ### ", "  #  ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "]),
    ('J', ["  ###", "   # ", "   # ", "   # ", "   # ", "#  # ", " ##  "]),
    ('K', ["#   #", "#  # ", "# #  ", "##   ", "# #  ", "#  # ", "#   #"]),
    ('L', ["#    ", "#    ", "#    ", "#    ", "#    ", "#    ", "#####"]),
    ('M', ["#   #", "## ##", "# # #", "#   #", "#   #", "#   #", "#   #"]),
    ('N', ["#   #", "##  #", "# # #", "#  ##", "#   #", "#   #", "#   #"]),
    ('O', [" ### ", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('P', ["#### ", "#   #", "#   #", "#### ", "#    ", "#    ", "#    "]),
    ('Q', [" ### ", "#   #", "#   #", "#   #", "# # #", "#  # ", " ## #"]),
    ('R', ["#### ", "#   #", "#   #", "#### ", "# #  ", "#  # ", "#   #"]),
    ('S', [" ####", "#    ", "#    ", " ### ", "    #", "    #", "#### "]),
    ('T', ["#####", "  #  ", "  #  ", "  #  ", "  #  ", "  #  ", "  #  "]),
    ('U', ["#   #", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('V', ["#   #", "#   #", "#   #", "#   #", " # # ", " # # ", "  #  "]),
    ('W', ["#   #", "#   #", "#   #", "# # #", "# # #", "## ##", "#   #"]),
    ('X', ["#   #", " # # ", "  #  ", "  #  ", "  #  ", " # # ", "#   #"]),
    ('Y', ["#   #", " # # ", "  #  ", "  #  ", "  #  ", "  #  ", "  #  "]),
    ('Z', ["#####", "    #", "   # ", "  #  ", " #   ", "#    ", "#####"]),
    (' ', ["     ", "     ", "     ", "     ", "     ", "     ", "     "]),
    (':', ["     ", "  #  ", "     ", "     ", "     ", "  #  ", "     "]),
    ('\'', ["  #  ", "  #  ", "     ", "     ", "     ", "     ", "     "]),
    ('Á', ["  #  ", " ### ", "#   #", "#   #", "#####", "#   #", "#   #"]),
    ('É', ["  #  ", "#####", "#    ", "#### ", "#    ", "#    ", "#####"]),
    ('Í', ["  #  ", " ### ", "  #  ", "  #  ", "  #  ", "  #  ", " ### "]),
    ('Ó', ["  #  ", " ### ", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('Ö', [" # # ", " ### ", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('Ő', ["#   #", " ### ", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('Ú', ["  #  ", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('Ü', [" # # ", "#   #", "#   #", "#   #", "#   #", "#   #", " ### "]),
    ('Ű', [" #  #", "#  # ", "     ", "#   #", "#   #", "#   #", " ### "]),
];

static BLANK: Glyph = [[0; GLYPH_WIDTH]; GLYPH_HEIGHT];

static GLYPHS: LazyLock<HashMap<char, Glyph>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|(ch, pattern)| (*ch, parse_pattern(*ch, pattern)))
        .collect()
});

fn parse_pattern(ch: char, pattern: &[&str; GLYPH_HEIGHT]) -> Glyph {
    let mut glyph = BLANK;
    for (row, line) in pattern.iter().enumerate() {
        debug_assert_eq!(
            line.chars().count(),
            GLYPH_WIDTH,
            "glyph '{ch}' row {row} has the wrong width",
        );
        for (col, c) in line.chars().take(GLYPH_WIDTH).enumerate() {
            glyph[row][col] = u8::from(c == '#');
        }
    }
    glyph
}

/// Return the glyph for `ch`. Characters without an entry render as the
/// space glyph, so lookup never fails and every character is 5 columns wide.
pub fn glyph(ch: char) -> &'static Glyph {
    GLYPHS.get(&ch).unwrap_or(&BLANK)
}

/// Whether `ch` has a glyph of its own rather than the blank fallback.
pub fn is_supported(ch: char) -> bool {
    GLYPHS.contains_key(&ch)
}

/// All characters with a glyph, in table order.
pub fn supported_chars() -> impl Iterator<Item = char> {
    PATTERNS.iter().map(|(ch, _)| *ch)
}
