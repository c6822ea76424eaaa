//! Block palette.

/// Color a block is painted with.
///
/// The terminal frontend maps each variant to an RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockColor {
    #[default]
    Cyan,
    Yellow,
    Magenta,
    Green,
    Red,
    Blue,
    Orange,
}

impl BlockColor {
    pub const ALL: [BlockColor; 7] = [
        BlockColor::Cyan,
        BlockColor::Yellow,
        BlockColor::Magenta,
        BlockColor::Green,
        BlockColor::Red,
        BlockColor::Blue,
        BlockColor::Orange,
    ];

    /// Color at `index` modulo the palette size.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockColor::Cyan => "cyan",
            BlockColor::Yellow => "yellow",
            BlockColor::Magenta => "magenta",
            BlockColor::Green => "green",
            BlockColor::Red => "red",
            BlockColor::Blue => "blue",
            BlockColor::Orange => "orange",
        }
    }
}
