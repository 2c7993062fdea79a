#![allow(dead_code)]

use myorm::{ExecResult, Executor, OrmError, OrmResult, Row, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

enum Reply {
    Rows(Vec<Row>),
    Error { message: String, sqlstate: String },
}

/// In-memory executor that records every statement.
///
/// `exec` pops queued results (default: nothing affected); `query` answers
/// with the first reply whose prefix matches (default: no rows).
#[derive(Default)]
pub struct MockExecutor {
    log: Mutex<Vec<String>>,
    exec_results: Mutex<VecDeque<OrmResult<ExecResult>>>,
    replies: Mutex<Vec<(String, Reply)>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_exec(&self, rows_affected: u64, last_insert_id: u64) {
        self.exec_results.lock().unwrap().push_back(Ok(ExecResult {
            rows_affected,
            last_insert_id,
        }));
    }

    pub fn push_exec_error(&self, message: &str) {
        self.exec_results
            .lock()
            .unwrap()
            .push_back(Err(OrmError::execution(message)));
    }

    pub fn reply_rows(&self, prefix: &str, rows: Vec<Row>) {
        self.replies
            .lock()
            .unwrap()
            .push((prefix.to_string(), Reply::Rows(rows)));
    }

    pub fn reply_error(&self, prefix: &str, message: &str, sqlstate: &str) {
        self.replies.lock().unwrap().push((
            prefix.to_string(),
            Reply::Error {
                message: message.to_string(),
                sqlstate: sqlstate.to_string(),
            },
        ));
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Executor for MockExecutor {
    async fn exec(&self, sql: &str) -> OrmResult<ExecResult> {
        self.log.lock().unwrap().push(sql.to_string());
        self.exec_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ExecResult::default()))
    }

    async fn query(&self, sql: &str) -> OrmResult<Vec<Row>> {
        self.log.lock().unwrap().push(sql.to_string());
        let replies = self.replies.lock().unwrap();
        match replies.iter().find(|(prefix, _)| sql.starts_with(prefix.as_str())) {
            Some((_, Reply::Rows(rows))) => Ok(rows.clone()),
            Some((_, Reply::Error { message, sqlstate })) => {
                Err(OrmError::execution_with_state(message.clone(), sqlstate.clone()))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// One `DESC` result row.
pub fn desc_row(field: &str, ty: &str, null: &str, default: Option<&str>, extra: &str) -> Row {
    Row::from_pairs([
        ("Field", Value::from(field)),
        ("Type", Value::from(ty)),
        ("Null", Value::from(null)),
        ("Key", Value::from("")),
        ("Default", Value::from(default)),
        ("Extra", Value::from(extra)),
    ])
}

/// One `SHOW INDEX` result row.
pub fn index_row(key: &str, non_unique: i64, column: &str, seq: i64) -> Row {
    Row::from_pairs([
        ("Non_unique", Value::Int(non_unique)),
        ("Key_name", Value::from(key)),
        ("Seq_in_index", Value::Int(seq)),
        ("Column_name", Value::from(column)),
    ])
}
