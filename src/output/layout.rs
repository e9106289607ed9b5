use anyhow::{anyhow, Result};
use itertools::Itertools;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionStyle {
    /// One option per line.
    Stacked,
    /// Options laid out side by side in `n` columns.
    Columns(u8),
}

/// Visual style of a rendered quiz document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub pages: &'static str,
    pub use_case: &'static str,
    pub font_size: &'static str,
    pub margin: &'static str,
    /// Blank space left under each subjective question.
    pub answer_space: &'static str,
    pub two_column: bool,
    pub colored: bool,
    pub option_style: OptionStyle,
}

static LAYOUTS: [Layout; 4] = [
    Layout {
        key: "default",
        name: "Professional Default",
        description: "Professional single-column layout with color-coded sections and spacious design",
        features: &["Single column", "Large fonts", "Color-coded boxes", "Professional styling"],
        pages: "4-6 pages typical",
        use_case: "Formal presentations, exams, professional documentation",
        font_size: "12pt",
        margin: "2.5cm",
        answer_space: "4cm",
        two_column: false,
        colored: true,
        option_style: OptionStyle::Stacked,
    },
    Layout {
        key: "compact",
        name: "Space-Efficient Compact",
        description: "Two-column layout with multi-column MCQ options for space efficiency",
        features: &["Two columns", "Compact fonts", "Multi-column MCQs", "Reduced spacing"],
        pages: "2-3 pages typical",
        use_case: "Printing, quick distribution, saving paper",
        font_size: "10pt",
        margin: "1.5cm",
        answer_space: "2cm",
        two_column: true,
        colored: true,
        option_style: OptionStyle::Columns(2),
    },
    Layout {
        key: "academic",
        name: "Academic Standard",
        description: "Traditional academic format with minimal colors and standard typography",
        features: &["Single column", "Minimal colors", "Standard fonts", "Academic styling"],
        pages: "3-5 pages typical",
        use_case: "University exams, academic assessments, formal testing",
        font_size: "11pt",
        margin: "2.5cm",
        answer_space: "3.5cm",
        two_column: false,
        colored: false,
        option_style: OptionStyle::Stacked,
    },
    Layout {
        key: "minimal",
        name: "Clean Minimal",
        description: "Minimalist black and white design with clean typography",
        features: &["No colors", "Clean lines", "Minimal decoration", "High contrast"],
        pages: "3-4 pages typical",
        use_case: "Black & white printing, simple assessments, distraction-free",
        font_size: "11pt",
        margin: "2cm",
        answer_space: "3cm",
        two_column: false,
        colored: false,
        option_style: OptionStyle::Columns(4),
    },
];

impl Layout {
    pub fn all() -> &'static [Layout] {
        &LAYOUTS
    }

    pub fn keys() -> Vec<&'static str> {
        LAYOUTS.iter().map(|l| l.key).collect()
    }

    pub fn find(key: &str) -> Result<&'static Layout> {
        LAYOUTS.iter().find(|l| l.key == key).ok_or_else(|| {
            anyhow!(
                "Unknown template `{}`. Available: {}",
                key,
                Layout::keys().join(", ")
            )
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.key, self.name)?;
        writeln!(f, "  Description: {}", self.description)?;
        writeln!(f, "  Features: {}", self.features.iter().join(", "))?;
        writeln!(f, "  Typical size: {}", self.pages)?;
        write!(f, "  Best for: {}", self.use_case)
    }
}
