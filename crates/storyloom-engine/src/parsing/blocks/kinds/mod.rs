//! Block-level constructs with owned markers.
//!
//! - **`Heading`**: one to four `#` followed by whitespace
//! - **`Bullet`**: optional indentation, `-`, `*` or `+`, then whitespace
//! - **`Rule`**: a line that is exactly `---`, `***` or `___`

pub mod bullet;
pub mod heading;
pub mod rule;

pub use bullet::Bullet;
pub use heading::Heading;
pub use rule::Rule;

/// Byte length of the leading whitespace run.
pub(crate) fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}
