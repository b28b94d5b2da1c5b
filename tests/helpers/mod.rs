#![allow(dead_code)]

pub mod architecture_helpers;
pub mod workspace_helpers;
