pub mod grid;
pub mod queue;
pub mod session;
pub mod track;
