// Service exports
pub mod loader;

pub use loader::load_catalog;
