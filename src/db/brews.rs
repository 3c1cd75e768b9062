use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Brew, BrewField, BrewFields, FieldSlots};

/// Comma-separated field columns in canonical order.
fn field_columns() -> String {
    BrewField::ALL
        .iter()
        .map(|field| field.column())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT` prefix shared by every query that hydrates a full [`Brew`]. The
/// column order matches what [`brew_from_row`] expects.
fn select_brews() -> String {
    format!("SELECT id, {}, created_at FROM brews", field_columns())
}

/// Map a row produced by [`select_brews`] back into a [`Brew`].
fn brew_from_row(row: &Row<'_>) -> rusqlite::Result<Brew> {
    let mut slots: FieldSlots = Default::default();
    for field in BrewField::ALL {
        slots[field.index()] = row.get(field.index() + 1)?;
    }
    Ok(Brew {
        id: row.get(0)?,
        fields: BrewFields::from_slots(slots),
        created_at: row.get(BrewField::ALL.len() + 1)?,
    })
}

/// Insert a validated brew and echo the hydrated record so callers do not
/// need a second round trip.
pub fn insert_brew(conn: &Connection, fields: &BrewFields, created_at: DateTime<Utc>) -> Result<Brew> {
    let placeholders = (1..=BrewField::ALL.len() + 1)
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO brews ({}, created_at) VALUES ({placeholders})",
        field_columns()
    );

    let values: Vec<Option<&str>> = BrewField::ALL
        .iter()
        .map(|field| fields.value(*field))
        .collect();
    let mut bound: Vec<&dyn ToSql> = values.iter().map(|value| value as &dyn ToSql).collect();
    bound.push(&created_at);

    conn.execute(&sql, bound.as_slice())
        .context("failed to insert brew")?;

    Ok(Brew {
        id: conn.last_insert_rowid(),
        fields: fields.clone(),
        created_at,
    })
}

/// Every brew, newest first. Brews written within the same millisecond fall
/// back to id order so the listing stays stable.
pub fn fetch_brews(conn: &Connection) -> Result<Vec<Brew>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC", select_brews());
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare brews query")?;

    let brews = stmt
        .query_map([], brew_from_row)
        .context("failed to iterate brews")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect brews")?;

    Ok(brews)
}

/// The most recently created brew, if any exist.
pub fn fetch_latest_brew(conn: &Connection) -> Result<Option<Brew>> {
    let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT 1", select_brews());
    conn.query_row(&sql, [], brew_from_row)
        .optional()
        .context("failed to load latest brew")
}

/// Distinct values for one column for the autocomplete hints. Each value is
/// ranked by the newest brew date it appears on; blanks and NULLs are skipped.
pub fn fetch_distinct_values(
    conn: &Connection,
    field: BrewField,
    limit: usize,
) -> Result<Vec<Option<String>>> {
    let column = field.column();
    let sql = format!(
        "SELECT {column} FROM brews
         WHERE {column} IS NOT NULL AND {column} <> ''
         GROUP BY {column}
         ORDER BY MAX(date) DESC, MAX(created_at) DESC
         LIMIT ?1"
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("failed to prepare {field} suggestion query"))?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let values = stmt
        .query_map(params![limit], |row| row.get(0))
        .with_context(|| format!("failed to iterate {field} suggestions"))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to collect {field} suggestions"))?;

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::models::tests::sample_draft;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn insert_with(conn: &Connection, field: BrewField, value: &str, date: &str, minute: i64) -> Brew {
        let fields = sample_draft()
            .with_value(BrewField::Date, date)
            .with_value(field, value)
            .validate()
            .unwrap();
        insert_brew(conn, &fields, at(minute)).unwrap()
    }

    #[test]
    fn test_insert_round_trips_every_field() {
        let conn = open_in_memory().unwrap();
        let fields = sample_draft()
            .with_value(BrewField::NewNotes, "jammy")
            .validate()
            .unwrap();
        let created = insert_brew(&conn, &fields, at(0)).unwrap();

        let stored = fetch_brews(&conn).unwrap();
        assert_eq!(stored, vec![created]);
        assert_eq!(stored[0].value(BrewField::NewNotes), Some("jammy"));
    }

    #[test]
    fn test_fetch_brews_on_empty_table() {
        let conn = open_in_memory().unwrap();
        assert!(fetch_brews(&conn).unwrap().is_empty());
        assert!(fetch_latest_brew(&conn).unwrap().is_none());
    }

    #[test]
    fn test_brews_are_listed_newest_first() {
        let conn = open_in_memory().unwrap();
        let first = insert_with(&conn, BrewField::Coffee, "one", "2024-01-01", 1);
        let second = insert_with(&conn, BrewField::Coffee, "two", "2024-01-01", 2);
        let third = insert_with(&conn, BrewField::Coffee, "three", "2024-01-01", 3);

        let ids: Vec<_> = fetch_brews(&conn).unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
        assert_eq!(fetch_latest_brew(&conn).unwrap(), Some(third));
    }

    #[test]
    fn test_same_timestamp_falls_back_to_id() {
        let conn = open_in_memory().unwrap();
        let first = insert_with(&conn, BrewField::Coffee, "one", "2024-01-01", 0);
        let second = insert_with(&conn, BrewField::Coffee, "two", "2024-01-01", 0);
        let ids: Vec<_> = fetch_brews(&conn).unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_distinct_values_follow_brew_date() {
        let conn = open_in_memory().unwrap();
        insert_with(&conn, BrewField::Roaster, "Old", "2023-05-01", 1);
        insert_with(&conn, BrewField::Roaster, "Newest", "2024-06-01", 2);
        insert_with(&conn, BrewField::Roaster, "Middle", "2024-01-01", 3);
        insert_with(&conn, BrewField::Roaster, "Old", "2023-06-01", 4);

        let values = fetch_distinct_values(&conn, BrewField::Roaster, 20).unwrap();
        assert_eq!(
            values,
            vec![
                Some("Newest".to_string()),
                Some("Middle".to_string()),
                Some("Old".to_string())
            ]
        );
    }

    #[test]
    fn test_distinct_values_skip_blank_notes() {
        let conn = open_in_memory().unwrap();
        insert_with(&conn, BrewField::Notes, "", "2024-01-01", 1);
        insert_with(&conn, BrewField::Notes, "floral", "2024-01-02", 2);
        let values = fetch_distinct_values(&conn, BrewField::Notes, 20).unwrap();
        assert_eq!(values, vec![Some("floral".to_string())]);
    }

    #[test]
    fn test_distinct_values_respect_limit() {
        let conn = open_in_memory().unwrap();
        for idx in 0..25 {
            insert_with(&conn, BrewField::Dose, &format!("{idx}"), "2024-01-01", idx);
        }
        let values = fetch_distinct_values(&conn, BrewField::Dose, 20).unwrap();
        assert_eq!(values.len(), 20);
    }
}
