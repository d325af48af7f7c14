pub mod grid;
pub mod letter;
pub mod snake;
