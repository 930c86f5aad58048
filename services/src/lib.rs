pub mod drive;
pub mod drive_sync;
pub mod email;
pub mod grading;
pub mod oauth;
pub mod reminders;
pub mod slack;
