pub mod guest;
pub mod movement;
pub mod staff;
pub mod table;
