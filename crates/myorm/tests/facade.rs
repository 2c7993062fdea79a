//! Facade behavior against an in-memory executor.

mod common;

use common::{MockExecutor, desc_row, index_row};
use myorm::prelude::*;
use myorm::{Assignments, OrmError, Row};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Entity)]
#[orm(table = "users", unique = "name")]
struct User {
    #[orm(increment)]
    id: u64,
    #[orm(sql_type = "varchar(20)")]
    name: String,
    age: i32,
}

fn ann() -> User {
    User {
        id: 0,
        name: "Ann".into(),
        age: 30,
    }
}

fn user_row(id: u64, name: &str, age: i32) -> Row {
    Row::from_pairs([
        ("id", Value::from(id)),
        ("name", Value::from(name)),
        ("age", Value::from(age)),
    ])
}

#[tokio::test]
async fn select_decodes_rows() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor()
        .reply_rows("SELECT", vec![user_row(1, "Ann", 30), user_row(2, "Bob", 41)]);

    let users = orm
        .select::<User>(&args![Cond::gte("age", 18), Order::asc("id"), Limit(2)])
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "Bob");
    assert_eq!(users[1].age, 41);
    assert_eq!(
        orm.executor().log(),
        vec!["SELECT `id`, `name`, `age` FROM `users` WHERE (`age` >= 18) ORDER BY `id` ASC LIMIT 2"]
    );
}

#[tokio::test]
async fn execution_errors_carry_sql() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor().push_exec_error("Duplicate entry 'Ann'");

    let err = orm.insert(&ann(), &[]).await.unwrap_err();
    assert_eq!(err.kind(), myorm::ErrorKind::Execution);
    assert_eq!(
        err.sql(),
        Some("INSERT INTO `users` (`name`, `age`) VALUES ('Ann', 30)")
    );
}

#[tokio::test]
async fn rejected_arguments() {
    let orm = Orm::new(MockExecutor::new());

    let err = orm.delete::<User>(&args![Offset(3)]).await.unwrap_err();
    assert!(matches!(
        err,
        OrmError::UnsupportedArgument {
            statement: "DELETE",
            argument: "offset"
        }
    ));

    let err = orm.insert(&ann(), &args![Limit(1)]).await.unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedArgument { .. }));

    let err = orm
        .select_or_insert(&ann(), &args![TableOptions::default().dry_run(true)])
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NoConditionsGiven));

    let err = orm.insert_many::<User>(&[], &[]).await.unwrap_err();
    assert!(matches!(err, OrmError::NoRecordsProvided));

    assert!(orm.executor().log().is_empty());
}

#[tokio::test]
async fn options_override_table_name() {
    let orm = Orm::new(MockExecutor::new());
    let out = orm
        .delete::<User>(&args![
            TableOptions::new("users_archive").dry_run(true),
            Cond::lt("age", 3),
            Limit(10),
        ])
        .await
        .unwrap();
    assert_eq!(
        out.into_statement().as_deref(),
        Some("DELETE FROM `users_archive` WHERE (`age` < 3) LIMIT 10")
    );
}

#[tokio::test]
async fn select_or_insert_reads_back_new_row() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor().push_exec(1, 7);
    orm.executor()
        .reply_rows("SELECT", vec![user_row(7, "Ann", 30)]);

    let rows = orm
        .select_or_insert(&ann(), &args![Cond::eq("name", "Ann")])
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(rows[0].id, 7);

    let log = orm.executor().log();
    assert_eq!(log.len(), 2);
    assert!(log[0].starts_with("INSERT INTO `users` (`name`, `age`) SELECT * FROM"));
    assert_eq!(
        log[1],
        "SELECT `id`, `name`, `age` FROM `users` WHERE `id` = 7"
    );
}

#[tokio::test]
async fn select_or_insert_reads_back_existing_rows() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor().push_exec(0, 0);
    orm.executor()
        .reply_rows("SELECT", vec![user_row(3, "Ann", 29)]);

    let rows = orm
        .select_or_insert(&ann(), &args![Cond::eq("name", "Ann")])
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(rows, vec![User { id: 3, name: "Ann".into(), age: 29 }]);
    assert_eq!(
        orm.executor().log()[1],
        "SELECT `id`, `name`, `age` FROM `users` WHERE (`name` = 'Ann')"
    );
}

#[tokio::test]
async fn insert_if_not_exists_skips_follow_up() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor().push_exec(0, 0);

    let res = orm
        .insert_if_not_exists(&ann(), &args![Cond::eq("name", "Ann")])
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(res.rows_affected, 0);
    assert_eq!(orm.executor().log().len(), 1);
}

#[tokio::test]
async fn on_duplicate_key_update() {
    let orm = Orm::new(MockExecutor::new());
    let set = Assignments::new().set("age", Value::raw("= VALUES(`age`)"));
    let mut bob = ann();
    bob.name = "Bob".into();

    orm.insert_many_on_duplicate_key_update(&[ann(), bob], &set, &[])
        .await
        .unwrap();
    assert_eq!(
        orm.executor().log(),
        vec![
            "INSERT INTO `users` (`name`, `age`) VALUES ('Ann', 30), ('Bob', 30) \
             ON DUPLICATE KEY UPDATE `age` = VALUES(`age`)"
        ]
    );

    let out = orm
        .insert_on_duplicate_key_update(
            &ann(),
            &set,
            &args![TableOptions::default().dry_run(true)],
        )
        .await
        .unwrap();
    assert!(out.is_statement());
}

#[tokio::test]
async fn auto_create_runs_once_before_writes() {
    let orm = Orm::new(MockExecutor::new());
    orm.auto_create_table();
    orm.executor()
        .reply_error("DESC `users`", "Table 'shop.users' doesn't exist", "42S02");

    orm.select::<User>(&[]).await.unwrap();
    assert_eq!(orm.executor().log(), vec!["SELECT `id`, `name`, `age` FROM `users`"]);
    orm.executor().clear_log();

    orm.insert(&ann(), &[]).await.unwrap();
    orm.insert(&ann(), &[]).await.unwrap();

    let log = orm.executor().log();
    assert_eq!(log.len(), 4);
    assert_eq!(log[0], "DESC `users`");
    assert!(log[1].starts_with("CREATE TABLE IF NOT EXISTS `users` (\n"));
    assert!(log[1].contains("UNIQUE KEY `uniq_name` (`name`)"));
    assert!(log[2].starts_with("INSERT INTO `users`"));
    assert!(log[3].starts_with("INSERT INTO `users`"));
    assert!(orm.is_table_created("users"));
}

#[tokio::test]
async fn auto_create_alters_existing_table() {
    let orm = Orm::with_config(MockExecutor::new(), OrmConfig::new().auto_create_table(true));
    orm.executor().reply_rows(
        "DESC `users`",
        vec![
            desc_row("id", "bigint unsigned", "NO", None, "auto_increment"),
            desc_row("name", "varchar(20)", "NO", Some(""), ""),
        ],
    );
    orm.executor().reply_rows(
        "SHOW INDEX FROM `users`",
        vec![index_row("PRIMARY", 0, "id", 1)],
    );

    orm.delete::<User>(&args![Cond::eq("id", 1)]).await.unwrap();
    assert_eq!(
        orm.executor().log(),
        vec![
            "DESC `users`",
            "SHOW INDEX FROM `users`",
            "ALTER TABLE `users` ADD COLUMN `age` int NOT NULL DEFAULT 0 COMMENT '' AFTER `name`",
            "ALTER TABLE `users` ADD UNIQUE `uniq_name` (`name`)",
            "DELETE FROM `users` WHERE (`id` = 1)",
        ]
    );
}

#[tokio::test]
async fn dry_run_never_reconciles() {
    let orm = Orm::new(MockExecutor::new());
    orm.auto_create_table();
    let out = orm
        .insert(&ann(), &args![TableOptions::default().dry_run(true)])
        .await
        .unwrap();
    assert!(out.is_statement());
    assert!(orm.executor().log().is_empty());
    assert!(!orm.is_table_created("users"));
}

#[tokio::test]
async fn create_table_executes_plan() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor()
        .reply_error("DESC `users`", "Table 'shop.users' doesn't exist", "42S02");

    let plan = orm
        .create_table::<User>(&args![TableOptions::default().dry_run(true)])
        .await
        .unwrap();
    assert!(!plan.exists);
    assert_eq!(orm.executor().log(), vec!["DESC `users`"]);

    let plan = orm.create_table::<User>(&[]).await.unwrap();
    assert_eq!(orm.executor().log()[2], plan.statements[0]);
    assert!(orm.is_table_created("users"));
}

#[tokio::test]
async fn other_describe_errors_propagate() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor()
        .reply_error("DESC `users`", "Access denied", "42000");

    let err = orm.create_or_alter_statements::<User>(&[]).await.unwrap_err();
    assert_eq!(err.sql(), Some("DESC `users`"));
}

#[tokio::test]
async fn with_executor_shares_caches() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor()
        .reply_error("DESC `users`", "Table 'shop.users' doesn't exist", "42S02");
    orm.create_table::<User>(&[]).await.unwrap();

    let tx = orm.with_executor(MockExecutor::new());
    tx.auto_create_table();
    assert!(orm.is_auto_create_table());
    tx.insert(&ann(), &[]).await.unwrap();
    assert_eq!(tx.executor().log().len(), 1);
}

#[tokio::test]
async fn metadata_helpers() {
    let orm = Orm::new(MockExecutor::new());
    orm.executor().reply_rows(
        "SELECT DATABASE()",
        vec![Row::from_pairs([("db", Value::from("shop"))])],
    );
    assert_eq!(orm.current_database().await.unwrap().as_deref(), Some("shop"));

    assert_eq!(orm.select_fields::<User>().unwrap(), "`id`, `name`, `age`");
    let fields = orm.struct_fields::<User>().unwrap();
    assert_eq!(fields[0].sql_type, "bigint unsigned");
    assert!(fields[0].auto_increment);

    let (keys, values) = orm.insert_fields(&ann()).unwrap();
    assert_eq!(keys, vec!["`name`", "`age`"]);
    assert_eq!(values, vec!["'Ann'", "30"]);
}

#[tokio::test]
async fn keep_alive_polls_until_stopped() {
    let exec = Arc::new(MockExecutor::new());
    let orm = Orm::with_config(
        Arc::clone(&exec),
        OrmConfig::new().keep_alive_interval(Duration::from_millis(5)),
    );

    let handle = orm.keep_alive().expect("first start spawns the task");
    assert!(orm.keep_alive().is_none());

    tokio::time::sleep(Duration::from_millis(40)).await;
    orm.stop_keep_alive();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(!orm.is_keeping_alive());
    assert!(exec.log().iter().any(|sql| sql == "SHOW TABLES"));
}
