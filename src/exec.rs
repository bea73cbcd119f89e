//! Planned statements and their bound arguments.
use crate::errors::PluginError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A value bound to a `$n` placeholder.
#[derive(Clone, PartialEq, Eq)]
pub enum Arg {
    /// a role or schema name
    Ident(String),
    Text(String),
    /// a password; never printed
    Secret(String),
}

impl Arg {
    pub fn as_str(&self) -> &str {
        match self {
            Arg::Ident(v) | Arg::Text(v) | Arg::Secret(v) => v,
        }
    }

    /// SQL text for this value: a quoted identifier or a quoted literal.
    pub fn quoted(&self) -> String {
        match self {
            Arg::Ident(v) => quote_ident(v),
            Arg::Text(v) | Arg::Secret(v) => quote_literal(v),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Ident(v) => f.debug_tuple("Ident").field(v).finish(),
            Arg::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Arg::Secret(_) => f.debug_tuple("Secret").field(&"***").finish(),
        }
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::Secret(_) => serializer.serialize_str("***"),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

/// One side-effecting statement: query text with positional placeholders plus
/// the values bound to them, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exec {
    pub query: String,
    pub args: Vec<Arg>,
}

impl Exec {
    pub fn new(query: &str, args: Vec<Arg>) -> Self {
        Self {
            query: query.to_owned(),
            args,
        }
    }

    /// Inline every `$n` as its quoted argument.
    ///
    /// Postgres does not accept bind parameters in utility statements
    /// (CREATE/ALTER/GRANT), so those have to go over the wire as plain text.
    pub fn render(&self) -> Result<String, PluginError> {
        let mut out = String::with_capacity(self.query.len());
        let mut chars = self.query.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            if digits.is_empty() {
                out.push(c);
                continue;
            }
            let position: usize = digits.parse().map_err(|_| {
                PluginError::InvalidStatement(format!("bad placeholder ${digits}"))
            })?;
            let arg = position
                .checked_sub(1)
                .and_then(|i| self.args.get(i))
                .ok_or_else(|| {
                    PluginError::InvalidStatement(format!(
                        "placeholder ${position} has no argument in '{}'",
                        self.query
                    ))
                })?;
            out.push_str(&arg.quoted());
        }
        Ok(out)
    }
}

// json view of a plan, used by the cli
impl Serialize for Exec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("query", &self.query)?;
        map.serialize_entry("args", &self.args)?;
        map.end()
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{escaped}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_inlines_identifiers_and_literals() {
        let exec = Exec::new(
            "CREATE USER $1 PASSWORD $2",
            vec![Arg::Ident("root".to_owned()), Arg::Secret("abc123".to_owned())],
        );
        assert_eq!(exec.render().unwrap(), "CREATE USER \"root\" PASSWORD 'abc123'");
    }

    #[test]
    fn render_repeats_a_placeholder() {
        let exec = Exec::new(
            "ALTER USER $1 SET SEARCH_PATH TO $1,pg_catalog",
            vec![Arg::Ident("admin".to_owned())],
        );
        assert_eq!(
            exec.render().unwrap(),
            "ALTER USER \"admin\" SET SEARCH_PATH TO \"admin\",pg_catalog"
        );
    }

    #[test]
    fn render_does_not_confuse_one_and_ten() {
        let args: Vec<Arg> = (1..=10).map(|i| Arg::Text(format!("v{i}"))).collect();
        let exec = Exec::new("SELECT $10, $1", args);
        assert_eq!(exec.render().unwrap(), "SELECT 'v10', 'v1'");
    }

    #[test]
    fn render_escapes_quotes_and_backslashes() {
        let exec = Exec::new(
            "CREATE USER $1 PASSWORD $2",
            vec![
                Arg::Ident("we\"ird".to_owned()),
                Arg::Secret("it's\\here".to_owned()),
            ],
        );
        assert_eq!(
            exec.render().unwrap(),
            "CREATE USER \"we\"\"ird\" PASSWORD E'it''s\\\\here'"
        );
    }

    #[test]
    fn render_keeps_a_bare_dollar() {
        let exec = Exec::new("SELECT '$' || $1", vec![Arg::Text("x".to_owned())]);
        assert_eq!(exec.render().unwrap(), "SELECT '$' || 'x'");
    }

    #[test]
    fn render_rejects_missing_arguments() {
        let exec = Exec::new("GRANT SELECT ON $1.t TO $2", vec![Arg::Ident("a".to_owned())]);
        assert!(matches!(
            exec.render(),
            Err(PluginError::InvalidStatement(_))
        ));
        let exec = Exec::new("SELECT $0", vec![Arg::Text("a".to_owned())]);
        assert!(exec.render().is_err());
    }

    #[test]
    fn secrets_stay_out_of_debug_and_json() {
        let exec = Exec::new(
            "CREATE USER $1 PASSWORD $2",
            vec![Arg::Ident("root".to_owned()), Arg::Secret("abc123".to_owned())],
        );
        assert!(!format!("{exec:?}").contains("abc123"));
        let json = serde_json::to_value(&exec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "CREATE USER $1 PASSWORD $2",
                "args": ["root", "***"],
            })
        );
    }
}
