//! List queries: search, exact-match filters, ordering and paging.
//!
//! Every entity declares a [`EntityQuery`] whitelisting the public field names
//! a client may filter, search or order by. Client input never reaches the
//! SQL text; values are always bound as parameters.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};

use super::{Database, DbError, DbResult};

/// Parameters for listing records of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Whitespace-separated terms; each must match some search field
    pub search: Option<String>,
    /// Exact-match `(field, value)` pairs
    pub filters: Vec<(String, String)>,
    /// Field names, `-` prefix for descending
    pub ordering: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.ordering.push(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build from URL-style query pairs.
    ///
    /// `search`, `ordering` (comma separated), `limit` and `offset` are
    /// reserved; every other key is a filter.
    pub fn from_pairs<I, K, V>(pairs: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = ListQuery::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "search" => {
                    if !value.trim().is_empty() {
                        query.search = Some(value.to_string());
                    }
                }
                "ordering" => query.ordering.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from),
                ),
                "limit" => query.limit = Some(parse_count(key, value)?),
                "offset" => query.offset = Some(parse_count(key, value)?),
                _ => query.filters.push((key.to_string(), value.to_string())),
            }
        }
        Ok(query)
    }
}

fn parse_count(key: &str, value: &str) -> DbResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| DbError::InvalidQuery(format!("{} must be a non-negative integer, got {:?}", key, value)))
}

/// How a filter value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterKind {
    Integer,
    Boolean,
    Text,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterField {
    pub name: &'static str,
    pub expr: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    pub(crate) const fn new(name: &'static str, expr: &'static str, kind: FilterKind) -> Self {
        Self { name, expr, kind }
    }

    fn bind(&self, raw: &str) -> DbResult<Value> {
        let raw = raw.trim();
        let invalid = || DbError::InvalidQuery(format!("invalid value for {}: {:?}", self.name, raw));
        match self.kind {
            FilterKind::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
            FilterKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Integer(1)),
                "false" | "0" => Ok(Value::Integer(0)),
                _ => Err(invalid()),
            },
            FilterKind::Text => Ok(Value::Text(raw.to_string())),
            FilterKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| invalid()),
        }
    }
}

/// Static description of one entity's list endpoint.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntityQuery {
    /// Column list matching the entity's row mapper
    pub columns: &'static str,
    /// FROM clause including any joins
    pub from: &'static str,
    /// Primary key expression, used as the final tiebreaker
    pub pk: &'static str,
    pub search: &'static [&'static str],
    pub filters: &'static [FilterField],
    /// Public ordering name to SQL expression
    pub ordering: &'static [(&'static str, &'static str)],
    pub default_order: &'static str,
}

/// SQL text plus bound parameters.
#[derive(Debug)]
pub(crate) struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Escape LIKE wildcards in a search term.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl EntityQuery {
    pub(crate) fn build(&self, query: &ListQuery) -> DbResult<BuiltQuery> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        for (name, raw) in &query.filters {
            let field = self
                .filters
                .iter()
                .find(|f| f.name == name.as_str())
                .ok_or_else(|| DbError::InvalidQuery(format!("unknown filter field: {}", name)))?;
            clauses.push(format!("{} = ?", field.expr));
            params.push(field.bind(raw)?);
        }

        if let Some(search) = &query.search {
            if !self.search.is_empty() {
                for term in search.split_whitespace() {
                    let any_field: Vec<String> = self
                        .search
                        .iter()
                        .map(|col| format!("{} LIKE ? ESCAPE '\\'", col))
                        .collect();
                    clauses.push(format!("({})", any_field.join(" OR ")));
                    let pattern = like_pattern(term);
                    params.extend(self.search.iter().map(|_| Value::Text(pattern.clone())));
                }
            }
        }

        let mut sql = format!("SELECT {} FROM {}", self.columns, self.from);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let order = if query.ordering.is_empty() {
            self.default_order.to_string()
        } else {
            let mut terms = Vec::with_capacity(query.ordering.len() + 1);
            for field in &query.ordering {
                let (name, direction) = match field.strip_prefix('-') {
                    Some(name) => (name, "DESC"),
                    None => (field.as_str(), "ASC"),
                };
                let expr = self
                    .ordering
                    .iter()
                    .find(|(public, _)| *public == name)
                    .map(|(_, expr)| *expr)
                    .ok_or_else(|| {
                        DbError::InvalidQuery(format!("unknown ordering field: {}", name))
                    })?;
                terms.push(format!("{} {}", expr, direction));
            }
            terms.push(format!("{} ASC", self.pk));
            terms.join(", ")
        };
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);

        match (query.limit, query.offset) {
            (None, None) => {}
            (limit, offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::Integer(limit.map(|l| l as i64).unwrap_or(-1)));
                params.push(Value::Integer(offset.unwrap_or(0) as i64));
            }
        }

        Ok(BuiltQuery { sql, params })
    }
}

impl Database {
    /// Run a list query and map each row.
    pub(crate) fn run_list<T, F>(&self, entity: &EntityQuery, query: &ListQuery, map: F) -> DbResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let built = entity.build(query)?;
        tracing::trace!(sql = %built.sql, "list query");
        let mut stmt = self.conn.prepare(&built.sql)?;
        let rows = stmt.query_map(params_from_iter(built.params.iter()), map)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THINGS: EntityQuery = EntityQuery {
        columns: "t.id, t.name",
        from: "things t",
        pk: "t.id",
        search: &["t.name", "t.note"],
        filters: &[
            FilterField::new("active", "t.active", FilterKind::Boolean),
            FilterField::new("owner", "t.owner_id", FilterKind::Integer),
            FilterField::new("day", "date(t.created)", FilterKind::Date),
        ],
        ordering: &[("name", "t.name"), ("id", "t.id")],
        default_order: "t.name ASC",
    };

    #[test]
    fn test_from_pairs() {
        let query = ListQuery::from_pairs([
            ("search", "heart"),
            ("ordering", "-name, id"),
            ("active", "true"),
            ("limit", "10"),
        ])
        .unwrap();
        assert_eq!(query.search.as_deref(), Some("heart"));
        assert_eq!(query.ordering, vec!["-name", "id"]);
        assert_eq!(query.filters, vec![("active".to_string(), "true".to_string())]);
        assert_eq!(query.limit, Some(10));

        assert!(matches!(
            ListQuery::from_pairs([("limit", "ten")]),
            Err(DbError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_build_default() {
        let built = THINGS.build(&ListQuery::new()).unwrap();
        assert_eq!(built.sql, "SELECT t.id, t.name FROM things t ORDER BY t.name ASC");
        assert!(built.params.is_empty());
    }

    #[test]
    fn test_build_filters_search_and_order() {
        let query = ListQuery::new()
            .filter("active", "false")
            .filter("owner", "7")
            .search("a_b c")
            .order_by("-name")
            .limit(5);
        let built = THINGS.build(&query).unwrap();

        assert!(built.sql.contains("t.active = ? AND t.owner_id = ?"));
        assert!(built
            .sql
            .contains("(t.name LIKE ? ESCAPE '\\' OR t.note LIKE ? ESCAPE '\\')"));
        assert!(built.sql.ends_with("ORDER BY t.name DESC, t.id ASC LIMIT ? OFFSET ?"));

        // 2 filters + 2 terms x 2 fields + limit/offset
        assert_eq!(built.params.len(), 8);
        assert_eq!(built.params[0], Value::Integer(0));
        assert_eq!(built.params[1], Value::Integer(7));
        assert_eq!(built.params[2], Value::Text("%a\\_b%".into()));
        assert_eq!(built.params[6], Value::Integer(5));
        assert_eq!(built.params[7], Value::Integer(0));
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_values() {
        assert!(matches!(
            THINGS.build(&ListQuery::new().filter("color", "red")),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            THINGS.build(&ListQuery::new().order_by("-color")),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            THINGS.build(&ListQuery::new().filter("owner", "seven")),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            THINGS.build(&ListQuery::new().filter("active", "maybe")),
            Err(DbError::InvalidQuery(_))
        ));
        assert!(matches!(
            THINGS.build(&ListQuery::new().filter("day", "2024-13-01")),
            Err(DbError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_offset_without_limit() {
        let built = THINGS.build(&ListQuery::new().offset(3)).unwrap();
        assert!(built.sql.ends_with("LIMIT ? OFFSET ?"));
        assert_eq!(built.params, vec![Value::Integer(-1), Value::Integer(3)]);
    }
}
