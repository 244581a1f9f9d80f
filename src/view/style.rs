use crossterm::style::{Attribute, Color};

/// Logical cell styles used by the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    #[default]
    Normal,
    Heading,
    Highlighted,
    Increase,
    Decrease,
    Header,
    Footer,
    Warning,
}

/// Concrete terminal colors for a style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colors {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Colors {
    pub fn attribute(&self) -> Attribute {
        if self.bold { Attribute::Bold } else { Attribute::NormalIntensity }
    }
}

impl Style {
    pub fn colors(self) -> Colors {
        let (fg, bg, bold) = match self {
            Style::Normal => (Color::White, Color::Black, false),
            Style::Heading => (Color::White, Color::Black, true),
            Style::Highlighted => (Color::Black, Color::White, false),
            Style::Increase => (Color::White, Color::DarkGreen, true),
            Style::Decrease => (Color::White, Color::DarkRed, true),
            Style::Header | Style::Footer => (Color::Black, Color::White, false),
            Style::Warning => (Color::Yellow, Color::Black, false),
        };
        Colors { fg, bg, bold }
    }
}
