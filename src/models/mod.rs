//! All the database models live here.

pub use invitation::*;

mod invitation;
