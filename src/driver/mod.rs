pub mod context;
pub mod control;
pub mod replay;
pub mod runner;
