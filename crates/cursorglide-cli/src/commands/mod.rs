pub mod bounds;
pub mod click;
pub mod config;
pub mod interactive;
pub mod move_to;
pub mod scroll;
