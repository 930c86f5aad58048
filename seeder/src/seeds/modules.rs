use crate::seed::Seeder;
use db::models::module::{Model, ModuleChanges, ModuleVisibility};
use sea_orm::DatabaseConnection;

pub struct ModuleSeeder;

struct DemoModule {
    title: &'static str,
    week: i32,
    capacity: i32,
    visibility: ModuleVisibility,
    grading_enabled: bool,
}

const DEMO_MODULES: [DemoModule; 6] = [
    DemoModule {
        title: "Ownership and Borrowing",
        week: 1,
        capacity: 10,
        visibility: ModuleVisibility::Active,
        grading_enabled: false,
    },
    DemoModule {
        title: "Pattern Matching",
        week: 2,
        capacity: 8,
        visibility: ModuleVisibility::Active,
        grading_enabled: true,
    },
    DemoModule {
        title: "Error Handling",
        week: 3,
        capacity: 8,
        visibility: ModuleVisibility::Active,
        grading_enabled: false,
    },
    DemoModule {
        title: "Traits and Generics",
        week: 4,
        capacity: 6,
        visibility: ModuleVisibility::PilotReview,
        grading_enabled: false,
    },
    DemoModule {
        title: "Async Foundations",
        week: 5,
        capacity: 6,
        visibility: ModuleVisibility::Draft,
        grading_enabled: false,
    },
    DemoModule {
        title: "Unsafe Rust",
        week: 6,
        capacity: 4,
        visibility: ModuleVisibility::Draft,
        grading_enabled: false,
    },
];

#[async_trait::async_trait]
impl Seeder for ModuleSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        for demo in DEMO_MODULES {
            let script_url = demo
                .grading_enabled
                .then_some("https://github.com/example-org/grading-scripts");
            let Ok(module) = Model::create(
                db,
                demo.title,
                demo.week,
                Some("Seeded demo module."),
                Some("Read the weekly material, then hand in the exercises."),
                demo.capacity,
                None,
                demo.grading_enabled,
                script_url,
                100,
            )
            .await
            else {
                continue;
            };

            if demo.visibility != ModuleVisibility::Draft {
                let _ = Model::edit(
                    db,
                    module.id,
                    ModuleChanges {
                        visibility: Some(demo.visibility),
                        ..Default::default()
                    },
                )
                .await;
            }
        }
    }
}
