use crate::models::module;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "selection_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionStatus {
    /// The user currently holds a seat on the module.
    #[sea_orm(string_value = "active")]
    Active,
    /// The seat was given back; the row is kept as history.
    #[sea_orm(string_value = "released")]
    Released,
}

/// A user's claim on a module seat.
///
/// At most one active selection exists per (user, module); the sum of a
/// module's active selections never exceeds its capacity. Both invariants
/// are maintained inside [`Model::select`]'s transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "selections")]
pub struct Model {
    /// Primary key of the selection.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The user holding (or having held) the seat.
    pub user_id: i64,
    /// The module the seat belongs to.
    pub module_id: i64,
    /// Active or released; see [`SelectionStatus`].
    pub status: SelectionStatus,
    /// Drive version token the user was last notified about.
    pub notified_version: Option<String>,
    /// When the seat was claimed.
    pub selected_at: DateTime<Utc>,
    /// When the seat was given back, if it was.
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id"
    )]
    Module,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Selection failures surfaced to the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Module not found")]
    ModuleNotFound,

    #[error("Module has no free seats")]
    CapacityExceeded,

    #[error("You already have an active selection for this module")]
    AlreadySelected,

    #[error("No active selection for this module")]
    NotSelected,

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl Model {
    /// Claims a seat on a module for a user.
    ///
    /// The whole operation runs in one transaction whose first statement is
    /// a conditional increment (`occupancy = occupancy + 1` where
    /// `occupancy < capacity`). Writing first makes the transaction take the
    /// database's write lock immediately, so two selectors racing for the
    /// last seat serialize on that statement and exactly one of them
    /// matches. Zero affected rows means either a full module or a missing
    /// one; the two cases are told apart afterwards.
    pub async fn select(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
    ) -> Result<Self, SelectionError> {
        let txn = db.begin().await?;
        let now = Utc::now();

        let claimed = module::Entity::update_many()
            .col_expr(
                module::Column::Occupancy,
                Expr::col(module::Column::Occupancy).add(1),
            )
            .col_expr(module::Column::UpdatedAt, Expr::value(now))
            .filter(module::Column::Id.eq(module_id))
            .filter(Expr::col(module::Column::Occupancy).lt(Expr::col(module::Column::Capacity)))
            .exec(&txn)
            .await?;

        if claimed.rows_affected == 0 {
            let exists = module::Entity::find_by_id(module_id)
                .one(&txn)
                .await?
                .is_some();
            txn.rollback().await?;
            return Err(if exists {
                SelectionError::CapacityExceeded
            } else {
                SelectionError::ModuleNotFound
            });
        }

        let already_active = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .one(&txn)
            .await?
            .is_some();

        if already_active {
            // Rolling back undoes the increment taken above.
            txn.rollback().await?;
            return Err(SelectionError::AlreadySelected);
        }

        let module = module::Entity::find_by_id(module_id)
            .one(&txn)
            .await?
            .ok_or(SelectionError::ModuleNotFound)?;

        let selection = ActiveModel {
            user_id: Set(user_id),
            module_id: Set(module_id),
            status: Set(SelectionStatus::Active),
            notified_version: Set(module.drive_version.clone()),
            selected_at: Set(now),
            released_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(selection)
    }

    /// Gives a seat back.
    ///
    /// Marks the active selection released and decrements the module's
    /// occupancy in the same transaction, so the freed seat is visible to
    /// the next `select` the moment this commits. The decrement carries an
    /// `occupancy > 0` floor so the counter can never go negative.
    pub async fn release(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
    ) -> Result<Self, SelectionError> {
        let txn = db.begin().await?;
        let now = Utc::now();

        let released = Entity::update_many()
            .col_expr(Column::Status, Expr::value(SelectionStatus::Released))
            .col_expr(Column::ReleasedAt, Expr::value(Some(now)))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .exec(&txn)
            .await?;

        if released.rows_affected == 0 {
            txn.rollback().await?;
            return Err(SelectionError::NotSelected);
        }

        module::Entity::update_many()
            .col_expr(
                module::Column::Occupancy,
                Expr::col(module::Column::Occupancy).sub(1),
            )
            .col_expr(module::Column::UpdatedAt, Expr::value(now))
            .filter(module::Column::Id.eq(module_id))
            .filter(Expr::col(module::Column::Occupancy).gt(0))
            .exec(&txn)
            .await?;

        let Some(selection) = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Released))
            .order_by_desc(Column::UpdatedAt)
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(SelectionError::NotSelected);
        };

        txn.commit().await?;
        Ok(selection)
    }

    /// The user's active selection for a module, if any.
    pub async fn find_active(
        db: &DatabaseConnection,
        user_id: i64,
        module_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .one(db)
            .await
    }

    /// All active selections a user holds.
    pub async fn active_for_user(
        db: &DatabaseConnection,
        user_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .order_by_asc(Column::SelectedAt)
            .all(db)
            .await
    }

    /// All active selections on a module.
    pub async fn active_for_module(
        db: &DatabaseConnection,
        module_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .all(db)
            .await
    }

    /// Number of active selections on a module.
    pub async fn count_active(db: &DatabaseConnection, module_id: i64) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::ModuleId.eq(module_id))
            .filter(Column::Status.eq(SelectionStatus::Active))
            .count(db)
            .await
    }

    /// Records the drive version the user was notified about.
    pub async fn set_notified_version(
        &self,
        db: &DatabaseConnection,
        version: &str,
    ) -> Result<Self, DbErr> {
        let mut active: ActiveModel = self.clone().into();
        active.notified_version = Set(Some(version.to_string()));
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{module::Model as Module, user::Model as User};
    use crate::test_utils::{setup_file_test_db, setup_test_db};

    async fn seed_user(db: &DatabaseConnection, tag: &str) -> User {
        User::upsert_from_identity(
            db,
            &format!("g-{tag}"),
            &format!("{tag}@example.com"),
            tag,
            None,
            false,
        )
        .await
        .unwrap()
    }

    async fn seed_module(db: &DatabaseConnection, capacity: i32) -> Module {
        Module::create(
            db,
            "Traits & Generics",
            4,
            None,
            None,
            capacity,
            None,
            false,
            None,
            100,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn select_claims_a_seat() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 2).await;

        let selection = Model::select(&db, user.id, module.id).await.unwrap();
        assert_eq!(selection.status, SelectionStatus::Active);

        let module = module::Entity::find_by_id(module.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(module.occupancy, 1);
        assert_eq!(Model::count_active(&db, module.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn select_seeds_notified_version_from_module() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 1).await;
        let module = module
            .set_drive_version(&db, "2026-07-01T10:00:00.000Z")
            .await
            .unwrap();

        let selection = Model::select(&db, user.id, module.id).await.unwrap();
        assert_eq!(
            selection.notified_version.as_deref(),
            Some("2026-07-01T10:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn double_select_is_already_selected() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 5).await;

        Model::select(&db, user.id, module.id).await.unwrap();
        let err = Model::select(&db, user.id, module.id).await.unwrap_err();
        assert!(matches!(err, SelectionError::AlreadySelected));

        // The failed attempt must not leak a seat.
        let module = module::Entity::find_by_id(module.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(module.occupancy, 1);
    }

    #[tokio::test]
    async fn full_module_rejects_with_capacity_exceeded() {
        let db = setup_test_db().await;
        let first = seed_user(&db, "u1").await;
        let second = seed_user(&db, "u2").await;
        let module = seed_module(&db, 1).await;

        Model::select(&db, first.id, module.id).await.unwrap();
        let err = Model::select(&db, second.id, module.id).await.unwrap_err();
        assert!(matches!(err, SelectionError::CapacityExceeded));
    }

    #[tokio::test]
    async fn select_missing_module_is_not_found() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let err = Model::select(&db, user.id, 999).await.unwrap_err();
        assert!(matches!(err, SelectionError::ModuleNotFound));
    }

    #[tokio::test]
    async fn select_release_select_succeeds() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 1).await;

        Model::select(&db, user.id, module.id).await.unwrap();
        let released = Model::release(&db, user.id, module.id).await.unwrap();
        assert_eq!(released.status, SelectionStatus::Released);
        assert!(released.released_at.is_some());

        // The freed seat is immediately claimable again.
        Model::select(&db, user.id, module.id).await.unwrap();

        let module = module::Entity::find_by_id(module.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(module.occupancy, 1);
    }

    #[tokio::test]
    async fn release_without_selection_is_not_selected() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 1).await;

        let err = Model::release(&db, user.id, module.id).await.unwrap_err();
        assert!(matches!(err, SelectionError::NotSelected));
    }

    #[tokio::test]
    async fn repeated_release_never_drives_occupancy_negative() {
        let db = setup_test_db().await;
        let user = seed_user(&db, "u1").await;
        let module = seed_module(&db, 1).await;

        Model::select(&db, user.id, module.id).await.unwrap();
        Model::release(&db, user.id, module.id).await.unwrap();
        let err = Model::release(&db, user.id, module.id).await.unwrap_err();
        assert!(matches!(err, SelectionError::NotSelected));

        let module = module::Entity::find_by_id(module.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(module.occupancy, 0);
    }

    /// Capacity property: N concurrent selectors against capacity K succeed
    /// exactly K times. Runs against a file-backed database so the tasks
    /// really do contend on separate pooled connections.
    #[tokio::test]
    async fn concurrent_selectors_fill_exactly_to_capacity() {
        let (db, _dir) = setup_file_test_db().await;
        const CAPACITY: i32 = 3;
        const SELECTORS: usize = 8;

        let module = seed_module(&db, CAPACITY).await;
        let mut users = Vec::new();
        for i in 0..SELECTORS {
            users.push(seed_user(&db, &format!("u{i}")).await);
        }

        let mut handles = Vec::new();
        for user in &users {
            let db = db.clone();
            let user_id = user.id;
            let module_id = module.id;
            handles.push(tokio::spawn(async move {
                Model::select(&db, user_id, module_id).await
            }));
        }

        let mut won = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(SelectionError::CapacityExceeded) => full += 1,
                Err(other) => panic!("unexpected selection error: {other}"),
            }
        }

        assert_eq!(won, CAPACITY as usize);
        assert_eq!(full, SELECTORS - CAPACITY as usize);

        let module = module::Entity::find_by_id(module.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(module.occupancy, CAPACITY);
        assert_eq!(
            Model::count_active(&db, module.id).await.unwrap(),
            CAPACITY as u64
        );
    }

    /// Two users race for a single seat: exactly one wins, the other gets
    /// the capacity conflict.
    #[tokio::test]
    async fn two_users_race_for_last_seat() {
        let (db, _dir) = setup_file_test_db().await;
        let a = seed_user(&db, "a").await;
        let b = seed_user(&db, "b").await;
        let module = seed_module(&db, 1).await;

        let (res_a, res_b) = tokio::join!(
            {
                let db = db.clone();
                let module_id = module.id;
                let user_id = a.id;
                async move { Model::select(&db, user_id, module_id).await }
            },
            {
                let db = db.clone();
                let module_id = module.id;
                let user_id = b.id;
                async move { Model::select(&db, user_id, module_id).await }
            }
        );

        let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let conflict = [res_a, res_b]
            .into_iter()
            .find(|r| r.is_err())
            .unwrap()
            .unwrap_err();
        assert!(matches!(conflict, SelectionError::CapacityExceeded));
    }
}
