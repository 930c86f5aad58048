use crate::seed::{Seeder, run_seeder};
use crate::seeds::{modules::ModuleSeeder, selections::SelectionSeeder, users::UserSeeder};

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let db = db::connect().await;

    for (seeder, name) in [
        (Box::new(UserSeeder) as Box<dyn Seeder + Send + Sync>, "User"),
        (Box::new(ModuleSeeder), "Module"),
        (Box::new(SelectionSeeder), "Selection"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
