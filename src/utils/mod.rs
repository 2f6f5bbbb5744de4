pub mod cursor;
pub mod id;
