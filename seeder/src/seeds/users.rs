use crate::seed::Seeder;
use db::models::user::Model;
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use sea_orm::DatabaseConnection;

pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        // Fixed demo accounts
        let _ = Model::upsert_from_identity(
            db,
            "g-demo-admin",
            "admin@example.com",
            "Demo Admin",
            None,
            true,
        )
        .await;
        let _ = Model::upsert_from_identity(
            db,
            "g-demo-reviewer",
            "reviewer@example.com",
            "Demo Reviewer",
            None,
            false,
        )
        .await;

        // Random reviewers
        for _ in 0..10 {
            let google_id = format!("g-{:08}", fastrand::u32(..100_000_000));
            let email: String = SafeEmail().fake();
            let name: String = Name().fake();
            let _ = Model::upsert_from_identity(db, &google_id, &email, &name, None, false).await;
        }
    }
}
