pub mod grade;
pub mod module;
pub mod notification;
pub mod selection;
pub mod submission;
pub mod user;
