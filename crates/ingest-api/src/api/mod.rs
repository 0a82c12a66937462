pub mod alliances;
pub mod cache_import;
pub mod jobs;
pub mod sde;
