//! Shared helpers with no dependency on the optimizer itself.

pub mod html;
pub mod path;
