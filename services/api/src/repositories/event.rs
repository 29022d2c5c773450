//! Event repository for database operations

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventSummary, EventWindow};

const SUMMARY_SELECT: &str = r#"
    SELECT e.id, e.name, e.description, e.date, e.time, e.location,
           e.category_id, c.name AS category_name, e.created_by,
           COUNT(r.id) AS participant_count
    FROM events e
    JOIN categories c ON c.id = e.category_id
    LEFT JOIN rsvps r ON r.event_id = e.id
"#;

/// Filters accepted by the event list endpoint. `created_by` is filled in
/// server-side for organizer-only actors, never from client input.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub category: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
}

/// Field set persisted for an event (validated upstream)
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category_id: Uuid,
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub total_events: i64,
    pub upcoming_events: i64,
    pub past_events: i64,
    pub total_participants: i64,
}

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List events with optional category, inclusive date range, and owner
    /// filters
    pub async fn list(&self, filters: &EventFilters) -> Result<Vec<EventSummary>> {
        let sql = format!(
            r#"
            {SUMMARY_SELECT}
            WHERE ($1::uuid IS NULL OR e.category_id = $1)
              AND ($2::date IS NULL OR e.date >= $2)
              AND ($3::date IS NULL OR e.date <= $3)
              AND ($4::uuid IS NULL OR e.created_by = $4)
            GROUP BY e.id, c.name
            ORDER BY e.date, e.time
            "#
        );

        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(filters.category)
            .bind(filters.start_date)
            .bind(filters.end_date)
            .bind(filters.created_by)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Case-insensitive substring search over event name and location
    pub async fn search(&self, query: &str) -> Result<Vec<EventSummary>> {
        if query.is_empty() {
            return self.list(&EventFilters::default()).await;
        }

        // Substring semantics: LIKE metacharacters in the query are literal.
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let sql = format!(
            r#"
            {SUMMARY_SELECT}
            WHERE e.name ILIKE $1 OR e.location ILIKE $1
            GROUP BY e.id, c.name
            ORDER BY e.date, e.time
            "#
        );

        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// List events within a dashboard window relative to `today`:
    /// upcoming = strictly after, ascending; past = strictly before,
    /// descending; all = everything ascending.
    pub async fn list_window(
        &self,
        window: EventWindow,
        today: NaiveDate,
    ) -> Result<Vec<EventSummary>> {
        let clause = match window {
            EventWindow::Upcoming => "WHERE e.date > $1 ",
            EventWindow::Past => "WHERE e.date < $1 ",
            EventWindow::All => "WHERE $1::date IS NOT NULL ",
        };
        let order = match window {
            EventWindow::Past => "ORDER BY e.date DESC, e.time",
            EventWindow::Upcoming | EventWindow::All => "ORDER BY e.date, e.time",
        };

        let sql = format!("{SUMMARY_SELECT} {clause} GROUP BY e.id, c.name {order}");

        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Events taking place exactly on `today`
    pub async fn list_on(&self, today: NaiveDate) -> Result<Vec<EventSummary>> {
        let sql =
            format!("{SUMMARY_SELECT} WHERE e.date = $1 GROUP BY e.id, c.name ORDER BY e.time");

        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Aggregate dashboard counts relative to `today`
    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events) AS total_events,
                (SELECT COUNT(*) FROM events WHERE date > $1) AS upcoming_events,
                (SELECT COUNT(*) FROM events WHERE date < $1) AS past_events,
                (SELECT COUNT(*) FROM participants) AS total_participants
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Find an event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, description, date, time, location, category_id,
                   created_by, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Create a new event; `created_by` is stamped by the handler when the
    /// creator is an organizer
    pub async fn create(&self, record: &EventRecord, created_by: Option<Uuid>) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, description, date, time, location, category_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, date, time, location, category_id,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.date)
        .bind(record.time)
        .bind(&record.location)
        .bind(record.category_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update an existing event (ownership is checked by the handler)
    pub async fn update(&self, id: Uuid, record: &EventRecord) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = $2, description = $3, date = $4, time = $5,
                location = $6, category_id = $7, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, date, time, location, category_id,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.date)
        .bind(record.time)
        .bind(&record.location)
        .bind(record.category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete an event; returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::CategoryRepository;

    async fn seed_category(pool: &PgPool) -> Uuid {
        CategoryRepository::new(pool.clone())
            .create("Workshops", "")
            .await
            .unwrap()
            .id
    }

    fn record(name: &str, date: NaiveDate, category_id: Uuid) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            description: String::new(),
            date,
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            location: "Main hall".to_string(),
            category_id,
        }
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn window_filters_are_strict_and_ordered(pool: PgPool) {
        let repo = EventRepository::new(pool.clone());
        let category_id = seed_category(&pool).await;
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        for (name, offset) in [("past2", -10), ("past1", -1), ("today", 0), ("next1", 1), ("next2", 10)] {
            let date = today + chrono::Duration::days(offset);
            repo.create(&record(name, date, category_id), None).await.unwrap();
        }

        let upcoming = repo.list_window(EventWindow::Upcoming, today).await.unwrap();
        let names: Vec<_> = upcoming.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["next1", "next2"]);

        let past = repo.list_window(EventWindow::Past, today).await.unwrap();
        let names: Vec<_> = past.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["past1", "past2"]);

        assert_eq!(repo.list_window(EventWindow::All, today).await.unwrap().len(), 5);
        assert_eq!(repo.list_on(today).await.unwrap().len(), 1);

        let stats = repo.dashboard_stats(today).await.unwrap();
        assert_eq!(stats.total_events, 5);
        assert_eq!(stats.upcoming_events, 2);
        assert_eq!(stats.past_events, 2);
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn owner_filter_hides_other_creators(pool: PgPool) {
        let repo = EventRepository::new(pool.clone());
        let category_id = seed_category(&pool).await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        let organizer: Uuid = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role) VALUES ('org_a', 'a@x.com', 'h', 'organizer') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        repo.create(&record("mine", date, category_id), Some(organizer)).await.unwrap();
        repo.create(&record("unowned", date, category_id), None).await.unwrap();

        let own = repo
            .list(&EventFilters { created_by: Some(organizer), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].name, "mine");

        let all = repo.list(&EventFilters::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn search_is_case_insensitive_substring(pool: PgPool) {
        let repo = EventRepository::new(pool.clone());
        let category_id = seed_category(&pool).await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        repo.create(&record("Intro to Rust", date, category_id), None).await.unwrap();
        let mut other = record("Cooking class", date, category_id);
        other.location = "Rustenburg".to_string();
        repo.create(&other, None).await.unwrap();
        repo.create(&record("Yoga", date, category_id), None).await.unwrap();

        // Matches name and location alike.
        assert_eq!(repo.search("rust").await.unwrap().len(), 2);
        // LIKE metacharacters are literal.
        assert_eq!(repo.search("%").await.unwrap().len(), 0);
        // Empty query returns the unfiltered list.
        assert_eq!(repo.search("").await.unwrap().len(), 3);
    }
}
