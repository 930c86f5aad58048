use crate::seed::Seeder;
use db::models::submission::{Model as Submission, SubmissionType};
use db::models::{module, selection, user};
use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

pub struct SelectionSeeder;

#[async_trait::async_trait]
impl Seeder for SelectionSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        let Ok(modules) = module::Model::list_visible(db).await else {
            return;
        };
        let Ok(users) = user::Entity::find().all(db).await else {
            return;
        };

        // The demo reviewer picks the first week and hands something in.
        let reviewer = users
            .iter()
            .find(|u| u.email == "reviewer@example.com")
            .cloned();
        if let (Some(reviewer), Some(first)) = (reviewer, modules.first()) {
            if selection::Model::select(db, reviewer.id, first.id)
                .await
                .is_ok()
            {
                let _ = Submission::submit(
                    db,
                    reviewer.id,
                    first.id,
                    SubmissionType::Homework,
                    "https://github.com/demo-reviewer/ownership-exercises",
                    Some("First pass through the exercises."),
                )
                .await;
            }
        }

        // Spread the remaining users over the open weeks. Capacity and
        // duplicate errors just mean the seat was taken, so they are ignored.
        for u in users.iter().filter(|u| !u.is_admin()) {
            if modules.is_empty() {
                break;
            }
            let pick = &modules[fastrand::usize(..modules.len())];
            let _ = selection::Model::select(db, u.id, pick.id).await;
        }
    }
}
