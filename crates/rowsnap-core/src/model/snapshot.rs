use crate::model::ResultSet;

/// Named, ordered collection of results recorded for one test
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub test_id: String,
    pub name: String,
    pub results: Vec<ResultSet>,
}

impl Snapshot {
    pub fn new(
        test_id: impl Into<String>,
        name: impl Into<String>,
        results: Vec<ResultSet>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            name: name.into(),
            results,
        }
    }

    /// Result with the given name
    pub fn result(&self, name: &str) -> Option<&ResultSet> {
        self.results.iter().find(|r| r.name() == name)
    }

    pub fn result_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.name()).collect()
    }
}
