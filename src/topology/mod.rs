mod face;
mod solid;

pub use face::{Face, FaceSurface};
pub use solid::Solid;
