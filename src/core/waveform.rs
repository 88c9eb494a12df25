//! Text waveform untuk deretan simbol
//!
//! Tiga baris level (+V, 0, -V), setiap simbol dua kolom, gaya step.

use crate::protocol::Symbol;

const LEVELS: [(i8, &str); 3] = [(1, "+V"), (0, " 0"), (-1, "-V")];
const CELL_ON: &str = "──";
const CELL_OFF: &str = "  ";

/// Render waveform dengan judul `signal for '<title>'`
pub fn render(symbols: &[Symbol], title: &str) -> String {
    let mut out = String::with_capacity((symbols.len() * 2 + 8) * 4 + title.len());
    out.push_str(&format!("signal for '{}'\n", title));

    for (level, label) in LEVELS {
        out.push_str(label);
        out.push_str(" |");
        for symbol in symbols {
            out.push_str(if symbol.level() == level {
                CELL_ON
            } else {
                CELL_OFF
            });
        }
        // Trailing spaces tidak berguna di terminal
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Symbol::{NegativeMark as N, PositiveMark as P, Zero as Z};

    #[test]
    fn test_render_levels() {
        let out = render(&[P, Z, N], "x");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "signal for 'x'");
        assert_eq!(lines[1], "+V |──");
        assert_eq!(lines[2], " 0 |  ──");
        assert_eq!(lines[3], "-V |    ──");
    }

    #[test]
    fn test_render_empty() {
        let out = render(&[], "");
        assert_eq!(out, "signal for ''\n+V |\n 0 |\n-V |\n");
    }
}
