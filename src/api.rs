pub mod actions;
pub mod commands;
