use super::*;
use crate::entity::{Cell, ColumnMember, Entity, Member};
use crate::error::OrmError;
use crate::model::{Index, Unique};
use crate::row::Row;
use crate::value::Value;
use chrono::NaiveDateTime;

struct Account {
    id: u64,
    name: String,
    email: String,
    created: NaiveDateTime,
}

impl Entity for Account {
    fn members() -> Vec<Member> {
        vec![
            ColumnMember::of::<u64>("id").increment().into(),
            ColumnMember::of::<String>("name")
                .sql_type("varchar(32)")
                .comment("display name")
                .into(),
            ColumnMember::of::<String>("email").sql_type("varchar(64)").into(),
            ColumnMember::of::<NaiveDateTime>("created")
                .sql_type("datetime(3)")
                .default_value("CURRENT_TIMESTAMP(3)")
                .into(),
        ]
    }

    fn table_options() -> TableOptions {
        TableOptions::new("accounts")
            .description("user accounts")
            .index(Index::new(["name"]))
            .unique(Unique::new(["email"]))
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::of(&self.id),
            Cell::of(&self.name),
            Cell::of(&self.email),
            Cell::of(&self.created),
        ]
    }
}

fn schema() -> Schema {
    Schema::of::<Account>().unwrap()
}

fn options() -> TableOptions {
    let mut options = Account::table_options();
    options.check().unwrap();
    options
}

fn live_without(names: &[&str]) -> Vec<Field> {
    schema()
        .fields()
        .iter()
        .filter(|f| !names.contains(&f.name.as_str()))
        .cloned()
        .collect()
}

fn declared_indexes() -> LiveIndexes {
    let mut live = LiveIndexes::default();
    live.indexes
        .insert("index_name".into(), Index::named("index_name", ["name"]));
    live.uniques
        .insert("uniq_email".into(), Unique::named("uniq_email", ["email"]));
    live
}

#[test]
fn column_clauses() {
    let s = schema();
    let clauses: Vec<String> = s.fields().iter().map(column_clause).collect();
    assert_eq!(
        clauses,
        vec![
            "`id` bigint unsigned NOT NULL AUTO_INCREMENT COMMENT ''",
            "`name` varchar(32) NOT NULL DEFAULT '' COMMENT 'display name'",
            "`email` varchar(64) NOT NULL DEFAULT '' COMMENT ''",
            "`created` datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3) COMMENT ''",
        ]
    );

    let mut f = s.field("created").unwrap().clone();
    f.on_update = Some("CURRENT_TIMESTAMP(3)".into());
    f.nullable = true;
    assert_eq!(
        column_clause(&f),
        "`created` datetime(3) NULL DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3) COMMENT ''"
    );
}

#[test]
fn create_statement() {
    let sql = create_table(&schema(), &options(), &TableDefaults::default());
    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `accounts` (\n\
         `id` bigint unsigned NOT NULL AUTO_INCREMENT COMMENT '',\n\
         `name` varchar(32) NOT NULL DEFAULT '' COMMENT 'display name',\n\
         `email` varchar(64) NOT NULL DEFAULT '' COMMENT '',\n\
         `created` datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3) COMMENT '',\n\
         PRIMARY KEY (`id`),\n\
         KEY `index_name` (`name`),\n\
         UNIQUE KEY `uniq_email` (`email`)\n\
         ) ENGINE=InnoDB AUTO_INCREMENT=1 DEFAULT CHARSET=utf8mb4 COMMENT 'user accounts'"
    );
}

#[test]
fn create_params_override_defaults() {
    let s = Schema::new(vec![
        Field::from_member(&ColumnMember::of::<i32>("n")).unwrap(),
    ])
    .unwrap();
    let options = TableOptions::new("counters")
        .param("engine", "MyISAM")
        .param("collate", "utf8mb4_bin");
    assert_eq!(
        create_table(&s, &options, &TableDefaults::default()),
        "CREATE TABLE IF NOT EXISTS `counters` (\n`n` int NOT NULL DEFAULT 0 COMMENT ''\n) \
         ENGINE=MyISAM DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin COMMENT ''"
    );
}

#[test]
fn missing_table_plans_create() {
    let plan = plan(&schema(), &options(), &LiveTable::Missing, &TableDefaults::default()).unwrap();
    assert!(!plan.exists);
    assert_eq!(plan.statements.len(), 1);
    assert!(plan.statements[0].starts_with("CREATE TABLE IF NOT EXISTS `accounts`"));
}

#[test]
fn one_missing_column_is_added_after_its_predecessor() {
    let live = LiveTable::Present {
        fields: live_without(&["email"]),
        indexes: declared_indexes(),
    };
    let plan = plan(&schema(), &options(), &live, &TableDefaults::default()).unwrap();
    assert!(plan.exists);
    assert_eq!(
        plan.statements,
        vec![
            "ALTER TABLE `accounts` ADD COLUMN `email` varchar(64) NOT NULL DEFAULT '' COMMENT '' AFTER `name`"
        ]
    );
}

#[test]
fn consecutive_missing_columns_keep_model_order() {
    let stmts = alter_statements(
        &schema(),
        &options(),
        &live_without(&["name", "email", "created"]),
        &declared_indexes(),
    )
    .unwrap();
    assert_eq!(stmts.len(), 3);
    assert!(stmts[0].contains("ADD COLUMN `name`") && stmts[0].ends_with("AFTER `id`"));
    assert!(stmts[1].contains("ADD COLUMN `email`") && stmts[1].ends_with("AFTER `name`"));
    assert!(stmts[2].contains("ADD COLUMN `created`") && stmts[2].ends_with("AFTER `email`"));
}

#[test]
fn first_column_is_added_first() {
    let s = Schema::new(vec![
        Field::from_member(&ColumnMember::of::<String>("label").sql_type("varchar(8)")).unwrap(),
        Field::from_member(&ColumnMember::of::<i32>("weight")).unwrap(),
    ])
    .unwrap();
    let live = vec![s.field("weight").unwrap().clone()];
    let stmts = alter_statements(
        &s,
        &TableOptions::new("tags"),
        &live,
        &LiveIndexes::default(),
    )
    .unwrap();
    assert_eq!(
        stmts,
        vec!["ALTER TABLE `tags` ADD COLUMN `label` varchar(8) NOT NULL DEFAULT '' COMMENT '' FIRST"]
    );
}

#[test]
fn new_increment_column_is_rejected() {
    let err = alter_statements(
        &schema(),
        &options(),
        &live_without(&["id"]),
        &declared_indexes(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        OrmError::NewPrimaryKeyNotAllowed { ref table, ref column } if table == "accounts" && column == "id"
    ));
}

#[test]
fn missing_keys_are_added() {
    let stmts = alter_statements(
        &schema(),
        &options(),
        &live_without(&[]),
        &LiveIndexes::default(),
    )
    .unwrap();
    assert_eq!(
        stmts,
        vec![
            "ALTER TABLE `accounts` ADD INDEX `index_name` (`name`)",
            "ALTER TABLE `accounts` ADD UNIQUE `uniq_email` (`email`)",
        ]
    );
}

#[test]
fn matching_table_needs_nothing() {
    let live = LiveTable::Present {
        fields: live_without(&[]),
        indexes: declared_indexes(),
    };
    let plan = plan(&schema(), &options(), &live, &TableDefaults::default()).unwrap();
    assert!(plan.exists);
    assert!(plan.is_empty());
}

fn desc_row(field: &str, ty: &str, null: &str, default: Value, extra: &str) -> Row {
    Row::from_pairs([
        ("Field", Value::from(field)),
        ("Type", Value::from(ty)),
        ("Null", Value::from(null)),
        ("Key", Value::from("")),
        ("Default", default),
        ("Extra", Value::from(extra)),
    ])
}

fn index_row(key: &str, non_unique: i64, column: &str, seq: i64) -> Row {
    Row::from_pairs([
        ("Table", Value::from("accounts")),
        ("Non_unique", Value::Int(non_unique)),
        ("Key_name", Value::from(key)),
        ("Seq_in_index", Value::Int(seq)),
        ("Column_name", Value::from(column)),
    ])
}

#[test]
fn decode_desc_rows() {
    let rows = vec![
        desc_row("id", "bigint unsigned", "NO", Value::Null, "auto_increment"),
        desc_row("name", "varchar(32)", "NO", Value::from("it's"), ""),
        desc_row("score", "int", "YES", Value::Null, ""),
        desc_row(
            "created",
            "datetime(3)",
            "NO",
            Value::from("CURRENT_TIMESTAMP(3)"),
            "DEFAULT_GENERATED on update CURRENT_TIMESTAMP(3)",
        ),
    ];
    let fields = decode_columns(&rows).unwrap();

    assert!(fields[0].auto_increment);
    assert!(!fields[0].nullable);
    assert_eq!(fields[0].default, "NULL");

    assert_eq!(fields[1].default, "'it\\'s'");
    assert!(!fields[1].auto_increment);

    assert!(fields[2].nullable);
    assert_eq!(fields[2].default, "NULL");

    assert_eq!(fields[3].default, "CURRENT_TIMESTAMP(3)");
    assert_eq!(fields[3].on_update.as_deref(), Some("CURRENT_TIMESTAMP(3)"));
}

#[test]
fn decode_desc_requires_columns() {
    let row = Row::from_pairs([("Field", Value::from("id"))]);
    let err = decode_columns(&[row]).unwrap_err();
    assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "Type"));
}

#[test]
fn decode_index_rows() {
    let rows = vec![
        index_row("PRIMARY", 0, "id", 1),
        index_row("idx_name_created", 1, "created", 2),
        index_row("idx_name_created", 1, "name", 1),
        index_row("uniq_email", 0, "email", 1),
    ];
    let live = decode_indexes(&rows).unwrap();
    assert!(!live.contains("PRIMARY"));
    assert_eq!(
        live.indexes["idx_name_created"].fields,
        vec!["name".to_string(), "created".to_string()]
    );
    assert_eq!(live.uniques["uniq_email"].fields, vec!["email".to_string()]);
    assert!(live.indexes.get("uniq_email").is_none());
}

#[test]
fn decoded_table_reconciles_to_nothing() {
    let rows = vec![
        desc_row("id", "bigint unsigned", "NO", Value::Null, "auto_increment"),
        desc_row("name", "varchar(32)", "NO", Value::from(""), ""),
        desc_row("email", "varchar(64)", "NO", Value::from(""), ""),
        desc_row("created", "datetime(3)", "NO", Value::from("CURRENT_TIMESTAMP(3)"), ""),
    ];
    let index_rows = vec![
        index_row("PRIMARY", 0, "id", 1),
        index_row("index_name", 1, "name", 1),
        index_row("uniq_email", 0, "email", 1),
    ];
    let live = LiveTable::Present {
        fields: decode_columns(&rows).unwrap(),
        indexes: decode_indexes(&index_rows).unwrap(),
    };
    let plan = plan(&schema(), &options(), &live, &TableDefaults::default()).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn metadata_statements() {
    assert_eq!(describe_columns_sql("accounts"), "DESC `accounts`");
    assert_eq!(describe_indexes_sql("accounts"), "SHOW INDEX FROM `accounts`");
}
