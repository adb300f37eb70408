//! Concrete runner implementations

pub mod native;
