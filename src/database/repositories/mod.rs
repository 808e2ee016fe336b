//! Repository implementations

pub mod school;

pub use school::SchoolRepository;
