use crate::model::scan_type::ScanType;

/// Schema fingerprint of one result column
///
/// Created by the resolver at scan time or by the codec at load time and
/// immutable afterwards. Declared attributes carry an explicit "declared"
/// flag because drivers may not report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColType {
    name: String,
    database_type: String,
    full_database_type: String,
    nullable: bool,
    has_nullable: bool,
    length: i64,
    has_length: bool,
    precision: i64,
    scale: i64,
    has_precision_scale: bool,
    scan_type: ScanType,
}

impl ColType {
    /// Column with only name, type name and scan type set
    pub fn new(
        name: impl Into<String>,
        database_type: impl Into<String>,
        scan_type: ScanType,
    ) -> Self {
        let database_type = database_type.into();
        Self {
            name: name.into(),
            full_database_type: database_type.clone(),
            database_type,
            nullable: false,
            has_nullable: false,
            length: 0,
            has_length: false,
            precision: 0,
            scale: 0,
            has_precision_scale: false,
            scan_type,
        }
    }

    pub fn with_full_database_type(mut self, full: impl Into<String>) -> Self {
        self.full_database_type = full.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self.has_nullable = true;
        self
    }

    pub fn with_length(mut self, length: i64) -> Self {
        self.length = length;
        self.has_length = true;
        self
    }

    pub fn with_precision_scale(mut self, precision: i64, scale: i64) -> Self {
        self.precision = precision;
        self.scale = scale;
        self.has_precision_scale = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database_type(&self) -> &str {
        &self.database_type
    }

    pub fn full_database_type(&self) -> &str {
        &self.full_database_type
    }

    /// Declared nullability, `None` if undeclared
    pub fn nullable(&self) -> Option<bool> {
        self.has_nullable.then_some(self.nullable)
    }

    /// Declared length, `None` if undeclared
    pub fn length(&self) -> Option<i64> {
        self.has_length.then_some(self.length)
    }

    /// Declared precision and scale, `None` if undeclared
    pub fn precision_scale(&self) -> Option<(i64, i64)> {
        self.has_precision_scale.then_some((self.precision, self.scale))
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// Schema equality: name, database type and scan type only
    ///
    /// Length, precision and scale are deliberately ignored.
    pub fn schema_eq(&self, other: &ColType) -> bool {
        self.name == other.name
            && self.database_type == other.database_type
            && self.scan_type == other.scan_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_attributes_are_none() {
        let c = ColType::new("id", "INTEGER", ScanType::Int64);
        assert_eq!(c.nullable(), None);
        assert_eq!(c.length(), None);
        assert_eq!(c.precision_scale(), None);
        assert_eq!(c.full_database_type(), "INTEGER");
    }

    #[test]
    fn test_schema_eq_ignores_length_and_precision() {
        let a = ColType::new("name", "VARCHAR", ScanType::Text).with_length(10);
        let b = ColType::new("name", "VARCHAR", ScanType::Text).with_length(255);
        assert!(a.schema_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_schema_eq_checks_scan_type() {
        let a = ColType::new("name", "VARCHAR", ScanType::Text);
        let b = ColType::new("name", "VARCHAR", ScanType::NullableText);
        assert!(!a.schema_eq(&b));
    }
}
