pub mod clean;
pub mod extract;
pub mod inventory;
pub mod pipeline;
pub mod status;
