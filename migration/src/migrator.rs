use crate::migrations::*;
use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m202607010001_create_users::Migration),
            Box::new(m202607010002_create_modules::Migration),
            Box::new(m202607010003_create_selections::Migration),
            Box::new(m202607010004_create_submissions::Migration),
            Box::new(m202607010005_create_grades::Migration),
            Box::new(m202607010006_create_notifications::Migration),
        ]
    }
}
