use crate::models::{Donation, DonationStatus, RecordDonationRequest};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// PostgreSQL client for donation records
///
/// Estimates and matches are never stored; a donation row exists only once an
/// organizer confirms a hand-off.
pub struct PostgresClient {
    pool: PgPool,
}

const DONATION_COLUMNS: &str = r#"
    id, organization_id, organization_name, event_type, plate_count, pickup_time,
    notes, donor_name, donor_contact, status, created_at, updated_at
"#;

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Create a client whose pool connects on first use
    ///
    /// Migrations are not run. Routes that never touch the database work without a server.
    pub fn connect_lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Record a confirmed donation in `pending` status
    pub async fn record_donation(&self, request: &RecordDonationRequest) -> Result<Donation, PostgresError> {
        if request.plate_count <= 0 {
            return Err(PostgresError::InvalidInput(format!(
                "plate_count must be positive, got {}",
                request.plate_count
            )));
        }

        let query = format!(
            r#"
            INSERT INTO donations (
                id, organization_id, organization_name, event_type, plate_count,
                pickup_time, notes, donor_name, donor_contact, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            DONATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&request.organization_id)
            .bind(&request.organization_name)
            .bind(&request.event_type)
            .bind(request.plate_count)
            .bind(&request.pickup_time)
            .bind(&request.notes)
            .bind(&request.donor_name)
            .bind(&request.donor_contact)
            .bind(DonationStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        let donation = row_to_donation(&row)?;

        tracing::info!(
            "Recorded donation {}: {} plates -> {}",
            donation.id,
            donation.plate_count,
            donation.organization_id
        );

        Ok(donation)
    }

    /// Fetch a single donation
    pub async fn get_donation(&self, id: Uuid) -> Result<Donation, PostgresError> {
        let query = format!("SELECT {} FROM donations WHERE id = $1", DONATION_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Donation {} not found", id)))?;

        Ok(row_to_donation(&row)?)
    }

    /// Donations for an organization, newest first
    pub async fn list_donations_for_organization(
        &self,
        organization_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Donation>, PostgresError> {
        let query = format!(
            r#"
            SELECT {}
            FROM donations
            WHERE organization_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            DONATION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(organization_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        let donations = rows
            .iter()
            .map(row_to_donation)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Organization {} has {} donations (offset {})",
            organization_id,
            donations.len(),
            offset
        );

        Ok(donations)
    }

    /// Move a donation to a new status
    ///
    /// The update only applies if the row still has the status it was read with,
    /// so concurrent transitions cannot skip a step.
    pub async fn update_donation_status(
        &self,
        id: Uuid,
        next: DonationStatus,
    ) -> Result<Donation, PostgresError> {
        let current = self.get_donation(id).await?;

        if !current.status.can_transition_to(next) {
            return Err(PostgresError::InvalidInput(format!(
                "cannot move donation {} from {:?} to {:?}",
                id, current.status, next
            )));
        }

        let query = format!(
            r#"
            UPDATE donations
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING {}
            "#,
            DONATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(next)
            .bind(current.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                PostgresError::InvalidInput(format!("donation {} changed status concurrently", id))
            })?;

        tracing::info!("Donation {} moved from {:?} to {:?}", id, current.status, next);

        Ok(row_to_donation(&row)?)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn row_to_donation(row: &PgRow) -> Result<Donation, sqlx::Error> {
    Ok(Donation {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        organization_name: row.try_get("organization_name")?,
        event_type: row.try_get("event_type")?,
        plate_count: row.try_get("plate_count")?,
        pickup_time: row.try_get("pickup_time")?,
        notes: row.try_get("notes")?,
        donor_name: row.try_get("donor_name")?,
        donor_contact: row.try_get("donor_contact")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> RecordDonationRequest {
        RecordDonationRequest {
            organization_id: "org-1".to_string(),
            organization_name: "City Food Relief".to_string(),
            event_type: Some("Wedding".to_string()),
            plate_count: 120,
            pickup_time: Some("2026-10-17T21:30:00+05:30".to_string()),
            notes: "Veg only".to_string(),
            donor_name: "Event Organizer".to_string(),
            donor_contact: "+91 9876500000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_donation_rejects_non_positive_plates() {
        let client = PostgresClient::connect_lazy("postgres://localhost:1/none").unwrap();
        let request = RecordDonationRequest {
            plate_count: 0,
            ..create_request()
        };

        assert!(matches!(
            client.record_donation(&request).await,
            Err(PostgresError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_donation_lifecycle() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let client = PostgresClient::new(&url, 2, 1, Duration::from_secs(5), Duration::from_secs(60))
            .await
            .unwrap();

        let donation = client.record_donation(&create_request()).await.unwrap();
        assert_eq!(donation.status, DonationStatus::Pending);

        let fetched = client.get_donation(donation.id).await.unwrap();
        assert_eq!(fetched.plate_count, 120);

        let accepted = client
            .update_donation_status(donation.id, DonationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.status, DonationStatus::Accepted);

        assert!(client
            .update_donation_status(donation.id, DonationStatus::Pending)
            .await
            .is_err());

        let listed = client.list_donations_for_organization("org-1", 10, 0).await.unwrap();
        assert!(listed.iter().any(|d| d.id == donation.id));
    }
}
