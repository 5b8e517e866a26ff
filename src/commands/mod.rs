pub mod catalog;
pub mod directory;
pub mod inventory;
pub mod orders;
pub mod reporting;
pub mod summary;
