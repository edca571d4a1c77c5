//! ANSI colour codes, switched off by `--no-color` or `NO_COLOR`.

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub green: &'static str,
    pub red: &'static str,
    pub yellow: &'static str,
    pub cyan: &'static str,
    pub dim: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        if color {
            Self {
                green: GREEN,
                red: RED,
                yellow: YELLOW,
                cyan: CYAN,
                dim: DIM,
                bold: BOLD,
                reset: RESET,
            }
        } else {
            Self {
                green: "",
                red: "",
                yellow: "",
                cyan: "",
                dim: "",
                bold: "",
                reset: "",
            }
        }
    }

    /// Colour unless the flag is set or `NO_COLOR` is present in the environment.
    pub fn detect(no_color_flag: bool) -> Self {
        Self::new(!no_color_flag && std::env::var_os("NO_COLOR").is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_palette_is_empty() {
        let p = Palette::new(false);
        assert_eq!(format!("{}x{}", p.red, p.reset), "x");
    }

    #[test]
    fn colour_palette_wraps() {
        let p = Palette::new(true);
        assert_eq!(format!("{}x{}", p.green, p.reset), "\x1b[32mx\x1b[0m");
    }

    #[test]
    fn flag_disables_colour() {
        assert_eq!(Palette::detect(true).bold, "");
    }
}
