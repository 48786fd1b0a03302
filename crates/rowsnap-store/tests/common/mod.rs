use rowsnap_core::errors::{Result, RowsnapError};
use rowsnap_core::{ColType, Database, ResultSet, ResultType, RowCursor, ScanType, Statement, Value};
use std::cell::RefCell;

/// Database fake that records every statement and can fail on the n-th exec
#[derive(Default)]
pub struct RecordingDb {
    pub statements: RefCell<Vec<Statement>>,
    pub fail_at: Option<usize>,
}

#[allow(dead_code)]
impl RecordingDb {
    pub fn failing_at(n: usize) -> Self {
        Self {
            statements: RefCell::new(Vec::new()),
            fail_at: Some(n),
        }
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements.borrow().iter().map(|s| s.sql.clone()).collect()
    }
}

impl Database for RecordingDb {
    fn query(
        &self,
        _stmt: &Statement,
        _visit: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()> {
        Err(RowsnapError::query("RecordingDb does not run queries"))
    }

    fn exec(&self, stmt: &Statement) -> Result<u64> {
        let mut statements = self.statements.borrow_mut();
        let index = statements.len();
        statements.push(stmt.clone());
        if self.fail_at == Some(index) {
            return Err(RowsnapError::query(format!("injected failure at statement {}", index)));
        }
        Ok(stmt.args.len() as u64)
    }
}

/// Single-column integer table result with ids `0..rows`
#[allow(dead_code)]
pub fn id_table(name: &str, rows: i64) -> ResultSet {
    let rt = ResultType::new(
        name,
        true,
        vec![ColType::new("id", "INTEGER", ScanType::Int64)],
    );
    ResultSet::new(rt, (0..rows).map(|i| vec![Value::Int64(i)]).collect()).unwrap()
}
