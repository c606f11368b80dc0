//! Parameterized SQL for the administrative banner listing.
//!
//! Every optional filter contributes its clause and its bind value in one
//! step, so placeholder numbers always match the parameter vector.

use banner::domain::BannerFilter;
use std::fmt;

/// Projection shared by every banner read. Tags come back ascending; a
/// banner without associations gets an empty array, not NULL.
pub(crate) const BANNER_COLUMNS: &str = "SELECT b.id, b.feature_id, b.content, b.is_active, \
     b.created_at, b.updated_at, \
     COALESCE(array_agg(bt.tag_id ORDER BY bt.tag_id) FILTER (WHERE bt.tag_id IS NOT NULL), '{}') \
     AS tag_ids \
     FROM banners b \
     LEFT JOIN banner_tags bt ON bt.banner_id = b.id";

const PLACEHOLDER: &str = "$?";

/// A built listing query with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerQuery {
    pub sql: String,
    pub params: Vec<i64>,
}

impl BannerQuery {
    /// Absent filters add no clause at all.
    pub fn for_filter(filter: &BannerFilter) -> Self {
        let mut builder = QueryBuilder::new(BANNER_COLUMNS);

        if let Some(feature_id) = filter.feature_id {
            builder.and_where("b.feature_id = $?", feature_id);
        }
        if let Some(tag_id) = filter.tag_id {
            builder.and_where(
                "b.id IN (SELECT banner_id FROM banner_tags WHERE tag_id = $?)",
                tag_id,
            );
        }

        builder.push(" GROUP BY b.id ORDER BY b.id");

        if let Some(limit) = filter.limit {
            builder.bind(" LIMIT $?", limit);
        }
        if let Some(offset) = filter.offset {
            builder.bind(" OFFSET $?", offset);
        }

        builder.finish()
    }
}

impl fmt::Display for BannerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

struct QueryBuilder {
    sql: String,
    params: Vec<i64>,
    has_where: bool,
}

impl QueryBuilder {
    fn new(base: &str) -> Self {
        Self {
            sql: base.to_string(),
            params: Vec::new(),
            has_where: false,
        }
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    /// Appends `fragment` with its `$?` slot numbered after the value pushed.
    fn bind(&mut self, fragment: &str, value: i64) {
        self.params.push(value);
        let placeholder = format!("${}", self.params.len());
        self.sql
            .push_str(&fragment.replacen(PLACEHOLDER, &placeholder, 1));
    }

    fn and_where(&mut self, condition: &str, value: i64) {
        let keyword = if self.has_where { " AND " } else { " WHERE " };
        self.has_where = true;
        self.push(keyword);
        self.bind(condition, value);
    }

    fn finish(self) -> BannerQuery {
        BannerQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}
