pub mod cursor;

pub use cursor::CursorError;
