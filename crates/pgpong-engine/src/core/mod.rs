pub use self::{action::*, frame::*};

pub(crate) mod action;
pub(crate) mod frame;
