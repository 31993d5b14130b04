//! Line and fullness rules shared by the board and the AI view.
//!
//! Rules are generic over the cell type so that the literal-mark board
//! and the ternary AI position evaluate the same eight lines.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, has_line};
