//! Business logic services

pub mod school_service;
pub mod temp_file;

pub use school_service::{SchoolPage, SchoolService};
pub use temp_file::TempUpload;
