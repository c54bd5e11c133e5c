// Library for tests to access modules

pub mod aggregation;
pub mod assembler;
pub mod config;
pub mod correlation;
pub mod error;
pub mod flatten;
pub mod models;
pub mod pipeline;
pub mod pivot;
pub mod schema;
pub mod selection;
pub mod snapshot_repo;
pub mod version;
