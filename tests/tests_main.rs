#[path = "helpers/mod.rs"]
mod helpers;

#[path = "semantic/mod.rs"]
mod semantic;

#[path = "project/mod.rs"]
mod project;

#[path = "ide/mod.rs"]
mod ide;

#[path = "architecture/mod.rs"]
mod architecture;
