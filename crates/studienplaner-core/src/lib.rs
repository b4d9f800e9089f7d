//! Core types, access control, and orchestration for Studienplaner.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement [`store::CourseStore`]; request-handling layers
//! call into [`service::Services`] with a [`access::Principal`].

pub mod access;
pub mod assignment;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod fanout;
pub mod id;
pub mod memory;
pub mod service;
pub mod store;
pub mod submission;
pub mod user;

pub use error::{Error, ErrorKind, Result};
