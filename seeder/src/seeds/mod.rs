pub mod modules;
pub mod selections;
pub mod users;
