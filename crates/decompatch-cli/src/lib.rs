pub mod acquire;
pub mod actions;
pub mod cmd;
pub mod decompile;
pub mod project;
