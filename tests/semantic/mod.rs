//! Resolution properties checked through the public API.

pub mod tests_resolution;
pub mod tests_type_algebra;
