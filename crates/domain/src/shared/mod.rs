pub mod entity;
pub mod role;
