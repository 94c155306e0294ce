// apps/gs_cli/src/commands/mod.rs

//! 命令实现

pub mod build;
pub mod info;
pub mod merge;
pub mod split;
pub mod validate;
