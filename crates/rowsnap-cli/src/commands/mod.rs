pub mod apply;
pub mod check;
pub mod record;
pub mod show;
pub mod target;
