mod pass;
mod registration;
mod status;

pub mod dtos {
    pub use crate::pass::dtos::*;
    pub use crate::registration::dtos::*;
}

pub use crate::pass::api::*;
pub use crate::registration::api::*;
pub use crate::status::api::*;
