//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::api::{BatchId, EventId, FacultyId, OfferingId, RoomId, SubjectId, TemplateId, VersionId};
use crate::db::repository::{
    ErrorContext, EventRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    TemplateRepository, VersionRepository,
};
use crate::models::{
    CourseOffering, Faculty, NewTimetableEvent, PeriodTemplate, Room, Slot, Subject, TimeOfDay,
    TimetableEvent, TimetableVersion, VersionStatus,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: parse_var("PG_MAX_RETRIES", 3) as u32,
            retry_delay_ms: parse_var("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures.
    ///
    /// The operation is retried up to `max_retries` times when a retryable
    /// error occurs (connection errors, timeouts, serialization failures),
    /// with exponential backoff between attempts.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

// ==================== Template Repository ====================

#[async_trait]
impl TemplateRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<PeriodTemplate>> {
        let rows = self
            .with_conn(|conn| {
                period_templates::table
                    .order(period_templates::created_at.desc())
                    .select(TemplateRow::as_select())
                    .load::<TemplateRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;

        rows.into_iter().map(TemplateRow::into_domain).collect()
    }

    async fn get_template(&self, template_id: TemplateId) -> RepositoryResult<PeriodTemplate> {
        let id = template_id.value();
        let row = self
            .with_conn(move |conn| {
                period_templates::table
                    .find(id)
                    .select(TemplateRow::as_select())
                    .first::<TemplateRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Template {} not found", template_id),
                    ErrorContext::new("get_template").with_entity_id(template_id),
                )
            })?;
        row.into_domain()
    }

    async fn get_active_template(&self) -> RepositoryResult<Option<PeriodTemplate>> {
        let row = self
            .with_conn(|conn| {
                period_templates::table
                    .filter(period_templates::is_active.eq(true))
                    .order(period_templates::updated_at.desc())
                    .select(TemplateRow::as_select())
                    .first::<TemplateRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.map(TemplateRow::into_domain).transpose()
    }

    async fn create_template(
        &self,
        name: &str,
        slots: &[Slot],
    ) -> RepositoryResult<PeriodTemplate> {
        let new_row = NewTemplateRow {
            name: name.to_string(),
            is_active: false,
            slots: slots_to_json(slots)?,
        };
        let row = self
            .with_conn(move |conn| {
                diesel::insert_into(period_templates::table)
                    .values(&new_row)
                    .returning(TemplateRow::as_select())
                    .get_result::<TemplateRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.into_domain()
    }

    async fn replace_template_slots(
        &self,
        template_id: TemplateId,
        slots: &[Slot],
    ) -> RepositoryResult<()> {
        let id = template_id.value();
        let slots_json = slots_to_json(slots)?;
        let updated = self
            .with_conn(move |conn| {
                diesel::update(period_templates::table.find(id))
                    .set((
                        period_templates::slots.eq(slots_json.clone()),
                        period_templates::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        if updated == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Template {} not found", template_id),
                ErrorContext::new("replace_template_slots").with_entity_id(template_id),
            ));
        }
        Ok(())
    }

    async fn deactivate_all_templates(&self) -> RepositoryResult<usize> {
        self.with_conn(|conn| {
            diesel::update(period_templates::table.filter(period_templates::is_active.eq(true)))
                .set((
                    period_templates::is_active.eq(false),
                    period_templates::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn activate_template(&self, template_id: TemplateId) -> RepositoryResult<()> {
        let id = template_id.value();
        let updated = self
            .with_conn(move |conn| {
                diesel::update(period_templates::table.find(id))
                    .set((
                        period_templates::is_active.eq(true),
                        period_templates::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        if updated == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Template {} not found", template_id),
                ErrorContext::new("activate_template").with_entity_id(template_id),
            ));
        }
        Ok(())
    }

    async fn delete_template(&self, template_id: TemplateId) -> RepositoryResult<usize> {
        let id = template_id.value();
        self.with_conn(move |conn| {
            diesel::delete(period_templates::table.find(id))
                .execute(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }
}

// ==================== Version Repository ====================

#[async_trait]
impl VersionRepository for PostgresRepository {
    async fn latest_draft(&self, batch_id: BatchId) -> RepositoryResult<Option<TimetableVersion>> {
        let batch = batch_id.value();
        let row = self
            .with_conn(move |conn| {
                timetable_versions::table
                    .filter(timetable_versions::batch_id.eq(batch))
                    .filter(timetable_versions::status.eq(VersionStatus::Draft.as_str()))
                    .order(timetable_versions::created_at.desc())
                    .select(VersionRow::as_select())
                    .first::<VersionRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.map(VersionRow::into_domain).transpose()
    }

    async fn latest_published(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Option<TimetableVersion>> {
        let batch = batch_id.value();
        let row = self
            .with_conn(move |conn| {
                timetable_versions::table
                    .filter(timetable_versions::batch_id.eq(batch))
                    .filter(timetable_versions::status.eq(VersionStatus::Published.as_str()))
                    .order(timetable_versions::published_at.desc())
                    .select(VersionRow::as_select())
                    .first::<VersionRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.map(VersionRow::into_domain).transpose()
    }

    async fn get_version(&self, version_id: VersionId) -> RepositoryResult<TimetableVersion> {
        let id = version_id.value();
        let row = self
            .with_conn(move |conn| {
                timetable_versions::table
                    .find(id)
                    .select(VersionRow::as_select())
                    .first::<VersionRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Version {} not found", version_id),
                    ErrorContext::new("get_version").with_entity_id(version_id),
                )
            })?;
        row.into_domain()
    }

    async fn list_versions(&self, batch_id: BatchId) -> RepositoryResult<Vec<TimetableVersion>> {
        let batch = batch_id.value();
        let rows = self
            .with_conn(move |conn| {
                timetable_versions::table
                    .filter(timetable_versions::batch_id.eq(batch))
                    .order(timetable_versions::created_at.desc())
                    .select(VersionRow::as_select())
                    .load::<VersionRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(VersionRow::into_domain).collect()
    }

    async fn create_version(
        &self,
        batch_id: BatchId,
        status: VersionStatus,
        name: &str,
    ) -> RepositoryResult<TimetableVersion> {
        let new_row = NewVersionRow {
            batch_id: batch_id.value(),
            status: status.as_str().to_string(),
            name: name.to_string(),
        };
        let row = self
            .with_conn(move |conn| {
                diesel::insert_into(timetable_versions::table)
                    .values(&new_row)
                    .returning(VersionRow::as_select())
                    .get_result::<VersionRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        row.into_domain()
    }

    async fn archive_published(&self, batch_id: BatchId) -> RepositoryResult<usize> {
        let batch = batch_id.value();
        self.with_conn(move |conn| {
            diesel::update(
                timetable_versions::table
                    .filter(timetable_versions::batch_id.eq(batch))
                    .filter(timetable_versions::status.eq(VersionStatus::Published.as_str())),
            )
            .set(timetable_versions::status.eq(VersionStatus::Archived.as_str()))
            .execute(conn)
            .map_err(RepositoryError::from)
        })
        .await
    }

    async fn mark_published(
        &self,
        version_id: VersionId,
        published_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let id = version_id.value();
        let updated = self
            .with_conn(move |conn| {
                diesel::update(timetable_versions::table.find(id))
                    .set((
                        timetable_versions::status.eq(VersionStatus::Published.as_str()),
                        timetable_versions::published_at.eq(Some(published_at)),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        if updated == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Version {} not found", version_id),
                ErrorContext::new("mark_published").with_entity_id(version_id),
            ));
        }
        Ok(())
    }
}

// ==================== Event Repository ====================

#[async_trait]
impl EventRepository for PostgresRepository {
    async fn events_for_version(
        &self,
        version_id: VersionId,
    ) -> RepositoryResult<Vec<TimetableEvent>> {
        let id = version_id.value();
        let rows = self
            .with_conn(move |conn| {
                timetable_events::table
                    .filter(timetable_events::version_id.eq(id))
                    .order((
                        timetable_events::day_of_week.asc(),
                        timetable_events::start_time.asc(),
                    ))
                    .select(EventRow::as_select())
                    .load::<EventRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(EventRow::into_domain).collect())
    }

    async fn get_event(&self, event_id: EventId) -> RepositoryResult<TimetableEvent> {
        let id = event_id.value();
        let row = self
            .with_conn(move |conn| {
                timetable_events::table
                    .find(id)
                    .select(EventRow::as_select())
                    .first::<EventRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Event {} not found", event_id),
                    ErrorContext::new("get_event").with_entity_id(event_id),
                )
            })?;
        Ok(row.into_domain())
    }

    async fn insert_event(&self, event: &NewTimetableEvent) -> RepositoryResult<TimetableEvent> {
        let new_row = NewEventRow::from_domain(event);
        let row = self
            .with_conn(move |conn| {
                diesel::insert_into(timetable_events::table)
                    .values(&new_row)
                    .returning(EventRow::as_select())
                    .get_result::<EventRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(row.into_domain())
    }

    async fn delete_event(&self, event_id: EventId) -> RepositoryResult<usize> {
        let id = event_id.value();
        self.with_conn(move |conn| {
            diesel::delete(timetable_events::table.find(id))
                .execute(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn delete_events(&self, event_ids: &[EventId]) -> RepositoryResult<usize> {
        let ids: Vec<i64> = event_ids.iter().map(|id| id.value()).collect();
        self.with_conn(move |conn| {
            diesel::delete(timetable_events::table.filter(timetable_events::id.eq_any(ids.clone())))
                .execute(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn delete_events_at_cell(
        &self,
        version_id: VersionId,
        day_of_week: i16,
        start_time: TimeOfDay,
    ) -> RepositoryResult<usize> {
        let id = version_id.value();
        let start = start_time.as_naive();
        self.with_conn(move |conn| {
            diesel::delete(
                timetable_events::table
                    .filter(timetable_events::version_id.eq(id))
                    .filter(timetable_events::day_of_week.eq(day_of_week))
                    .filter(timetable_events::start_time.eq(start)),
            )
            .execute(conn)
            .map_err(RepositoryError::from)
        })
        .await
    }

    async fn upsert_events(&self, events: &[NewTimetableEvent]) -> RepositoryResult<usize> {
        let rows: Vec<NewEventRow> = events.iter().map(NewEventRow::from_domain).collect();
        self.with_conn(move |conn| {
            let mut written = 0;
            for row in &rows {
                written += diesel::insert_into(timetable_events::table)
                    .values(row)
                    .on_conflict((
                        timetable_events::version_id,
                        timetable_events::day_of_week,
                        timetable_events::start_time,
                    ))
                    .do_update()
                    .set((
                        timetable_events::offering_id.eq(excluded(timetable_events::offering_id)),
                        timetable_events::end_time.eq(excluded(timetable_events::end_time)),
                        timetable_events::room_id.eq(excluded(timetable_events::room_id)),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::from)?;
            }
            Ok(written)
        })
        .await
    }

    async fn update_event_room(
        &self,
        event_id: EventId,
        room_id: Option<RoomId>,
    ) -> RepositoryResult<()> {
        let id = event_id.value();
        let room = room_id.map(|r| r.value());
        let updated = self
            .with_conn(move |conn| {
                diesel::update(timetable_events::table.find(id))
                    .set(timetable_events::room_id.eq(room))
                    .execute(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        if updated == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Event {} not found", event_id),
                ErrorContext::new("update_event_room").with_entity_id(event_id),
            ));
        }
        Ok(())
    }
}

// ==================== Reference Repository ====================

#[async_trait]
impl ReferenceRepository for PostgresRepository {
    async fn offerings_for_batch(
        &self,
        batch_id: BatchId,
    ) -> RepositoryResult<Vec<CourseOffering>> {
        let batch = batch_id.value();
        let rows = self
            .with_conn(move |conn| {
                course_offerings::table
                    .filter(course_offerings::batch_id.eq(batch))
                    .order(course_offerings::created_at.desc())
                    .select(OfferingRow::as_select())
                    .load::<OfferingRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(OfferingRow::into_domain).collect())
    }

    async fn get_offering(&self, offering_id: OfferingId) -> RepositoryResult<CourseOffering> {
        let id = offering_id.value();
        let row = self
            .with_conn(move |conn| {
                course_offerings::table
                    .find(id)
                    .select(OfferingRow::as_select())
                    .first::<OfferingRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Offering {} not found", offering_id),
                    ErrorContext::new("get_offering").with_entity_id(offering_id),
                )
            })?;
        Ok(row.into_domain())
    }

    async fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        let rows = self
            .with_conn(|conn| {
                rooms::table
                    .order(rooms::room_number.asc())
                    .select(RoomRow::as_select())
                    .load::<RoomRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(RoomRow::into_domain).collect())
    }

    async fn get_room(&self, room_id: RoomId) -> RepositoryResult<Room> {
        let id = room_id.value();
        let row = self
            .with_conn(move |conn| {
                rooms::table
                    .find(id)
                    .select(RoomRow::as_select())
                    .first::<RoomRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Room {} not found", room_id)))?;
        Ok(row.into_domain())
    }

    async fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>> {
        let rows = self
            .with_conn(|conn| {
                faculty::table
                    .order(faculty::name.asc())
                    .select(FacultyRow::as_select())
                    .load::<FacultyRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        Ok(rows.into_iter().map(FacultyRow::into_domain).collect())
    }

    async fn get_faculty(&self, faculty_id: FacultyId) -> RepositoryResult<Faculty> {
        let id = faculty_id.value();
        let row = self
            .with_conn(move |conn| {
                faculty::table
                    .find(id)
                    .select(FacultyRow::as_select())
                    .first::<FacultyRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Faculty {} not found", faculty_id))
            })?;
        Ok(row.into_domain())
    }

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let rows = self
            .with_conn(|conn| {
                subjects::table
                    .order(subjects::code.asc())
                    .select(SubjectRow::as_select())
                    .load::<SubjectRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;
        rows.into_iter().map(SubjectRow::into_domain).collect()
    }

    async fn get_subject(&self, subject_id: SubjectId) -> RepositoryResult<Subject> {
        let id = subject_id.value();
        let row = self
            .with_conn(move |conn| {
                subjects::table
                    .find(id)
                    .select(SubjectRow::as_select())
                    .first::<SubjectRow>(conn)
                    .optional()
                    .map_err(RepositoryError::from)
            })
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(format!("Subject {} not found", subject_id))
            })?;
        row.into_domain()
    }
}
