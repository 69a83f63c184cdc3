//! End-to-end tests: render a model, execute it, read it back, diff it.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use ddlforge_core::prelude::*;
use ddlforge_live::prelude::*;

async fn pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

fn shop_model() -> Database {
    Database::new("shop")
        .table(
            Table::new("users")
                .column(Column::new("id", TypeCode::Integer).primary_key().auto_increment())
                .column(Column::new("email", TypeCode::Varchar).size("254").required())
                .column(Column::new("bio", TypeCode::LongVarchar))
                .column(Column::new("balance", TypeCode::Decimal).size("10,2").default_value("0")),
        )
        .table(
            Table::new("orders")
                .column(Column::new("id", TypeCode::Integer).primary_key())
                .column(Column::new("user_id", TypeCode::Integer).required())
                .column(Column::new("placed_at", TypeCode::Timestamp).required())
                .foreign_key(ForeignKey::new("users").named("fk_orders_users").reference("user_id", "id"))
                .index(Index::new("idx_orders_user").column("user_id")),
        )
}

async fn create(pool: &SqlitePool, model: &Database) {
    let platform = SqlitePlatform::new();
    let statements = platform.create_database_sql(model).unwrap();
    let report = BatchExecutor::new(pool)
        .execute_statements(&statements)
        .await
        .unwrap();
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn test_round_trip_preserves_structure() {
    let pool = pool().await;
    let model = shop_model();
    create(&pool, &model).await;

    let live = read_database(&pool, "shop", &ReadOptions::default()).await.unwrap();
    assert_eq!(live.table_names(), vec!["orders", "users"]);

    let users = live.find_table("users").unwrap();
    let id = users.find_column("id").unwrap();
    assert_eq!(id.type_code, TypeCode::Integer);
    assert!(id.primary_key);
    assert!(id.required);
    assert!(id.auto_increment);

    let email = users.find_column("email").unwrap();
    assert_eq!(email.type_code, TypeCode::Varchar);
    assert_eq!(email.size.as_deref(), Some("254"));
    assert!(email.required);

    assert_eq!(users.find_column("bio").unwrap().type_code, TypeCode::LongVarchar);

    let balance = users.find_column("balance").unwrap();
    assert_eq!(balance.type_code, TypeCode::Decimal);
    assert_eq!(balance.size.as_deref(), Some("10,2"));
    assert_eq!(balance.default.as_deref(), Some("0"));

    let orders = live.find_table("orders").unwrap();
    assert_eq!(orders.foreign_keys.len(), 1);
    let fk = &orders.foreign_keys[0];
    assert!(fk.references_match(&model.find_table("orders").unwrap().foreign_keys[0]));

    let index = orders.find_index("idx_orders_user").unwrap();
    assert!(!index.unique);
    assert_eq!(index.columns.len(), 1);
    assert_eq!(index.columns[0].name, "user_id");
}

#[tokio::test]
async fn test_diff_against_live_model_is_empty() {
    let pool = pool().await;
    let model = shop_model();
    create(&pool, &model).await;

    let live = read_database(&pool, "shop", &ReadOptions::default()).await.unwrap();
    let platform = SqlitePlatform::new();
    let differ = SchemaDiffer::new(&platform, AlterationOptions::default().do_drops(true));

    let self_diff = differ.alter_database_sql(&live, &live).unwrap();
    assert!(self_diff.is_empty(), "self-diff produced: {self_diff:?}");

    let model_diff = differ.alter_database_sql(&live, &model).unwrap();
    assert!(model_diff.is_empty(), "live model drifted from source: {model_diff:?}");
}

#[tokio::test]
async fn test_add_nullable_column_scenario() {
    let pool = pool().await;
    let current_model = Database::new("test")
        .table(Table::new("roundtrip").column(Column::new("pk", TypeCode::Integer).primary_key()));
    create(&pool, &current_model).await;

    let desired = Database::new("test").table(
        Table::new("roundtrip")
            .column(Column::new("pk", TypeCode::Integer).primary_key())
            .column(Column::new("avalue2", TypeCode::Integer)),
    );

    let live = read_database(&pool, "test", &ReadOptions::default()).await.unwrap();
    let platform = SqlitePlatform::new();
    let statements = SchemaDiffer::new(&platform, AlterationOptions::default())
        .alter_database_sql(&live, &desired)
        .unwrap();
    assert_eq!(statements, vec!["ALTER TABLE \"roundtrip\" ADD COLUMN \"avalue2\" INTEGER"]);

    let executor = BatchExecutor::new(&pool);
    executor.execute_statements(&statements).await.unwrap();
    executor
        .execute_dml("INSERT INTO roundtrip (pk) VALUES (1)", 1)
        .await
        .unwrap();

    let row = sqlx::query("SELECT avalue2 FROM roundtrip WHERE pk = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    let value: Option<i64> = row.get("avalue2");
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_drop_column_scenario() {
    let pool = pool().await;
    let current_model = Database::new("test").table(
        Table::new("roundtrip")
            .column(Column::new("pk", TypeCode::Integer).primary_key())
            .column(Column::new("keep", TypeCode::Varchar).size("20"))
            .column(
                Column::new("legacy", TypeCode::Varchar)
                    .size("10")
                    .required()
                    .default_value("x"),
            ),
    );
    create(&pool, &current_model).await;

    let executor = BatchExecutor::new(&pool);
    executor
        .execute_dml("INSERT INTO roundtrip (pk, keep) VALUES (1, 'hello')", 1)
        .await
        .unwrap();

    let desired = Database::new("test").table(
        Table::new("roundtrip")
            .column(Column::new("pk", TypeCode::Integer).primary_key())
            .column(Column::new("keep", TypeCode::Varchar).size("20")),
    );

    let live = read_database(&pool, "test", &ReadOptions::default()).await.unwrap();
    let platform = SqlitePlatform::new();
    let statements = SchemaDiffer::new(&platform, AlterationOptions::default().do_drops(true))
        .alter_database_sql(&live, &desired)
        .unwrap();
    assert_eq!(statements, vec!["ALTER TABLE \"roundtrip\" DROP COLUMN \"legacy\""]);
    executor.execute_statements(&statements).await.unwrap();

    let row = sqlx::query("SELECT keep FROM roundtrip WHERE pk = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    let keep: String = row.get("keep");
    assert_eq!(keep, "hello");
}

#[tokio::test]
async fn test_skipped_drops_surface_as_comments_and_execute_harmlessly() {
    let pool = pool().await;
    let current_model = Database::new("test")
        .table(Table::new("old").column(Column::new("id", TypeCode::Integer).primary_key()));
    create(&pool, &current_model).await;

    let live = read_database(&pool, "test", &ReadOptions::default()).await.unwrap();
    let platform = SqlitePlatform::new();
    let statements = SchemaDiffer::new(&platform, AlterationOptions::default())
        .alter_database_sql(&live, &Database::new("test"))
        .unwrap();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].starts_with("--"));

    let report = BatchExecutor::new(&pool)
        .execute_statements(&statements)
        .await
        .unwrap();
    assert_eq!(report, BatchReport { executed: 0, errors: 0 });

    // The table is still there.
    let live_after = read_database(&pool, "test", &ReadOptions::default()).await.unwrap();
    assert!(live_after.find_table("old").is_some());
}

#[tokio::test]
async fn test_schema_pattern_filters_tables() {
    let pool = pool().await;
    create(&pool, &shop_model()).await;

    let options = ReadOptions::default().schema_pattern("user%");
    let live = read_database(&pool, "shop", &options).await.unwrap();
    assert_eq!(live.table_names(), vec!["users"]);
}
