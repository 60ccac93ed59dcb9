use sqlx::{Postgres, QueryBuilder};

use crate::filter::MeasurementFilter;

const MEASUREMENT_LIST_SELECT: &str = r#"SELECT m.id, m.value, m."timestamp", m.series_id, s.name AS series_name, s.color
FROM measurements m
JOIN series s ON m.series_id = s.id"#;

/// Build the measurement listing statement for a filter. Every user value is
/// pushed as a bind parameter.
pub fn measurement_list_query(filter: &MeasurementFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(MEASUREMENT_LIST_SELECT);
    let mut first = true;

    let mut next_clause = |builder: &mut QueryBuilder<'static, Postgres>| {
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(ids) = &filter.series_ids {
        next_clause(&mut builder);
        builder.push("m.series_id = ANY(").push_bind(ids.clone()).push(")");
    }
    if let Some(start) = filter.start {
        next_clause(&mut builder);
        builder.push(r#"m."timestamp" >= "#).push_bind(start);
    }
    if let Some(end) = filter.end {
        next_clause(&mut builder);
        builder.push(r#"m."timestamp" <= "#).push_bind(end);
    }

    builder.push(r#" ORDER BY m."timestamp" DESC, m.id DESC"#);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn unfiltered_query_has_no_where() {
        let builder = measurement_list_query(&MeasurementFilter::default());
        let sql = builder.sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with(r#"ORDER BY m."timestamp" DESC, m.id DESC"#));
    }

    #[test]
    fn clauses_are_joined_with_and_and_bound() {
        let filter = MeasurementFilter {
            series_ids: Some(vec![1, 2]),
            start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        };
        let builder = measurement_list_query(&filter);
        let sql = builder.sql();
        assert!(sql.contains(r#" WHERE m.series_id = ANY($1) AND m."timestamp" >= $2 AND m."timestamp" <= $3"#));
    }

    #[test]
    fn time_only_filter_starts_with_where() {
        let filter = MeasurementFilter {
            end: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let builder = measurement_list_query(&filter);
        assert!(builder.sql().contains(r#" WHERE m."timestamp" <= $1"#));
    }
}
