pub mod delete;
pub mod resources;
pub mod status;
