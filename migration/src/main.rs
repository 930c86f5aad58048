use colored::Colorize;
use migration::Migrator;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

fn database_url() -> String {
    let path = common::config::database_path();
    if path.starts_with("sqlite:") {
        return path;
    }
    if let Some(parent) = std::path::Path::new(&path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create database directory");
    }
    format!("sqlite://{path}?mode=rwc")
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = database_url();
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");

    match mode.as_str() {
        "up" => {
            println!("{}", "Applying pending migrations...".cyan());
            Migrator::up(&db, None)
                .await
                .expect("Failed to apply migrations");
            println!("{}", "Migrations applied.".green());
        }
        "fresh" => {
            println!(
                "{}",
                "Dropping all tables and re-applying migrations...".yellow()
            );
            Migrator::fresh(&db).await.expect("Failed to refresh schema");
            println!("{}", "Schema rebuilt from scratch.".green());
        }
        "status" => {
            Migrator::status(&db)
                .await
                .expect("Failed to query migration status");
        }
        other => {
            eprintln!("{} {}", "Unknown mode:".red(), other);
            eprintln!("Usage: migration [up|fresh|status]");
            std::process::exit(1);
        }
    }
}
