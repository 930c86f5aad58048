mod admin_test;
mod auth_test;
mod health_test;
mod me_test;
mod modules_test;
mod submissions_test;
mod users_test;
