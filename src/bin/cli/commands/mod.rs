pub mod history;
pub mod manage;
pub mod restore;
pub mod save;
pub mod tags;
