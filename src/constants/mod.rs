//! 定数のドメイン別分割
//!
//! `use crate::constants::*` で全定数を参照できるよう再 export している。

mod ai;
mod bar;
mod render;
mod world;

pub use ai::*;
pub use bar::*;
pub use render::*;
pub use world::*;
