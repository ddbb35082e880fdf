/// Inline emphasis styles and the delimiters that spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EmphasisStyle {
    BoldItalic,
    Bold,
    Italic,
}

pub struct Emphasis;

impl Emphasis {
    /// Delimiters in match precedence: longer runs before shorter ones so
    /// `***x***` is never read as emphasis around bold.
    pub const DELIMITERS: [(&'static str, EmphasisStyle); 5] = [
        ("***", EmphasisStyle::BoldItalic),
        ("**", EmphasisStyle::Bold),
        ("*", EmphasisStyle::Italic),
        ("__", EmphasisStyle::Bold),
        ("_", EmphasisStyle::Italic),
    ];

    pub fn starts_delimiter(b: u8) -> bool {
        b == b'*' || b == b'_'
    }
}
