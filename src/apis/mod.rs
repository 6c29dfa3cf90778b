// Workforce data sources

pub mod factory;
pub mod in_memory;
pub mod profile_list;
pub mod tabular_file;

pub use factory::create_adapter;
