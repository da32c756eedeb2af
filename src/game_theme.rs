use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameTheme {
    #[default]
    Monokai,
    Solarized,
    Dracula,
    GruvboxDark,
    Nord,
    OneDark,
    HighContrast,
}

pub struct ThemeColors {
    pub background: Color,
    pub border: Color,
    pub text: Color,
    pub accent: Color,
    pub paddle: Color,
    pub ai_paddle: Color,
    pub ball: Color,
}

impl GameTheme {
    pub const ALL: [GameTheme; 7] = [
        GameTheme::Monokai,
        GameTheme::Solarized,
        GameTheme::Dracula,
        GameTheme::GruvboxDark,
        GameTheme::Nord,
        GameTheme::OneDark,
        GameTheme::HighContrast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GameTheme::Monokai => "Monokai",
            GameTheme::Solarized => "Solarized",
            GameTheme::Dracula => "Dracula",
            GameTheme::GruvboxDark => "Gruvbox Dark",
            GameTheme::Nord => "Nord",
            GameTheme::OneDark => "One Dark",
            GameTheme::HighContrast => "High Contrast",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> GameTheme {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> GameTheme {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            GameTheme::Monokai => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(249, 38, 114), // Monokai pink
                text: Color::Rgb(248, 248, 242), // Monokai foreground
                accent: Color::Rgb(166, 226, 46), // Monokai green
                paddle: Color::Rgb(102, 217, 239), // Monokai cyan
                ai_paddle: Color::Rgb(230, 219, 116), // Monokai yellow
                ball: Color::Rgb(255, 95, 135), // Monokai light pink
            },
            GameTheme::Solarized => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(38, 139, 210), // Solarized blue
                text: Color::Rgb(101, 123, 131), // Solarized base00
                accent: Color::Rgb(42, 161, 152), // Solarized cyan
                paddle: Color::Rgb(133, 153, 0), // Solarized green
                ai_paddle: Color::Rgb(181, 137, 0), // Solarized yellow
                ball: Color::Rgb(220, 50, 47), // Solarized red
            },
            GameTheme::Dracula => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(255, 121, 198), // Dracula pink
                text: Color::Rgb(248, 248, 242), // Dracula foreground
                accent: Color::Rgb(189, 147, 249), // Dracula purple
                paddle: Color::Rgb(80, 250, 123), // Dracula green
                ai_paddle: Color::Rgb(241, 250, 140), // Dracula yellow
                ball: Color::Rgb(255, 85, 85), // Dracula red
            },
            GameTheme::GruvboxDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(250, 189, 47), // Gruvbox yellow
                text: Color::Rgb(235, 219, 178), // Gruvbox fg
                accent: Color::Rgb(184, 187, 38), // Gruvbox green
                paddle: Color::Rgb(131, 165, 152), // Gruvbox blue
                ai_paddle: Color::Rgb(254, 128, 25), // Gruvbox orange
                ball: Color::Rgb(251, 73, 52), // Gruvbox red
            },
            GameTheme::Nord => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(136, 192, 208), // Nord frost
                text: Color::Rgb(216, 222, 233), // Nord snow storm
                accent: Color::Rgb(143, 188, 187), // Nord teal
                paddle: Color::Rgb(94, 129, 172), // Nord blue
                ai_paddle: Color::Rgb(235, 203, 139), // Nord yellow
                ball: Color::Rgb(191, 97, 106), // Nord red
            },
            GameTheme::OneDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(198, 120, 221), // One Dark purple
                text: Color::Rgb(171, 178, 191), // One Dark fg
                accent: Color::Rgb(97, 175, 239), // One Dark blue
                paddle: Color::Rgb(152, 195, 121), // One Dark green
                ai_paddle: Color::Rgb(229, 192, 123), // One Dark yellow
                ball: Color::Rgb(224, 108, 117), // One Dark red
            },
            // true black background, primaries only
            GameTheme::HighContrast => ThemeColors {
                background: Color::Black,
                border: Color::White,
                text: Color::White,
                accent: Color::Yellow,
                paddle: Color::Rgb(0, 255, 255), // bright cyan
                ai_paddle: Color::Rgb(0, 255, 0), // bright green
                ball: Color::Rgb(255, 0, 0), // bright red
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(GameTheme::HighContrast.next(), GameTheme::Monokai);
        assert_eq!(GameTheme::Monokai.prev(), GameTheme::HighContrast);
        assert_eq!(GameTheme::Nord.next().prev(), GameTheme::Nord);
    }

    #[test]
    fn themes_persist_as_snake_case() {
        let json = serde_json::to_string(&GameTheme::GruvboxDark).unwrap();
        assert_eq!(json, r#""gruvbox_dark""#);
    }
}
