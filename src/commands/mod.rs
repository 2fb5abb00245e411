pub mod install;
pub mod remove;
pub mod status;
pub mod update;
