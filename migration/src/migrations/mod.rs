pub mod m202607010001_create_users;
pub mod m202607010002_create_modules;
pub mod m202607010003_create_selections;
pub mod m202607010004_create_submissions;
pub mod m202607010005_create_grades;
pub mod m202607010006_create_notifications;
