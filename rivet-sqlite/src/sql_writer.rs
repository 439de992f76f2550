use rivet_core::SqlWriter;

/// Sqlite dialect, booleans are stored as integers.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push(['0', '1'][value as usize]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_core::Value;

    #[test]
    fn booleans_as_integers() {
        let writer = SqliteSqlWriter::new();
        let mut out = String::new();
        writer.write_value(&mut out, &Value::Boolean(Some(true)));
        out.push(' ');
        writer.write_value(&mut out, &Value::Boolean(Some(false)));
        out.push(' ');
        writer.write_value(&mut out, &Value::Boolean(None));
        assert_eq!(out, "1 0 NULL");
    }
}
