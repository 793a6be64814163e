use crate::core::geo;
use crate::models::{
    HousingType, Landlord, Listing, ListingFilters, ListingStatus, Reservation,
    ReservationStatus, Review, Tenant, TenantPreference,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with the data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

const LISTING_COLUMNS: &str = "id, landlord_id, title, pitch, address, latitude, longitude, \
     price, housing_type, status, score, photos, created_at";

const RESERVATION_COLUMNS: &str = "id, tenant_id, listing_id, status, amount, start_date, \
     end_date, contract_url, secure_payment, created_at";

const REVIEW_COLUMNS: &str =
    "id, tenant_id, landlord_id, listing_id, rating, comment, created_at";

/// Input for creating a listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub landlord_id: Uuid,
    pub title: String,
    pub pitch: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: i32,
    pub housing_type: HousingType,
    pub status: ListingStatus,
    pub photos: Vec<String>,
}

/// Partial listing update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub pitch: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<i32>,
    pub housing_type: Option<HousingType>,
    pub status: Option<ListingStatus>,
    pub photos: Option<Vec<String>>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.pitch.is_none()
            && self.address.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.price.is_none()
            && self.housing_type.is_none()
            && self.status.is_none()
            && self.photos.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub tenant_id: Option<Uuid>,
    pub landlord_id: Option<Uuid>,
    pub listing_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilters {
    pub listing_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub landlord_id: Option<Uuid>,
    pub rating_min: Option<i16>,
    pub rating_max: Option<i16>,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub tenant_id: Uuid,
    pub listing_id: Uuid,
    pub amount: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub contract_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationFilters {
    pub tenant_id: Option<Uuid>,
    pub listing_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub start_from: Option<DateTime<Utc>>,
    pub end_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPreference {
    pub tenant_id: Uuid,
    pub housing_type: HousingType,
    pub budget_min: i32,
    pub budget_max: i32,
    pub radius_km: i32,
    pub notes: Option<String>,
}

/// PostgreSQL-backed data store.
///
/// The store owns the schema (embedded migrations run on startup) and is
/// the single shared mutable resource of the service. Listing rows are
/// read-mostly; the two write paths with ordering requirements (reserving
/// a listing, recomputing its score) go through dedicated methods below.
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    // ---- listings ----

    /// Fetch candidate listings for a search.
    ///
    /// The cheap equality/range/bounding-box constraints are pushed down to
    /// SQL and the row count is capped; the in-memory engine re-applies
    /// every filter and owns ordering and pagination, so this result only
    /// has to be a superset of the survivors.
    pub async fn fetch_candidates(
        &self,
        filters: &ListingFilters,
        cap: i64,
    ) -> Result<Vec<Listing>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings WHERE 1 = 1"));

        if let Some(housing_type) = filters.housing_type {
            qb.push(" AND housing_type = ").push_bind(housing_type);
        }
        if let Some(price_min) = filters.price_min {
            qb.push(" AND price >= ").push_bind(price_min);
        }
        if let Some(price_max) = filters.price_max {
            qb.push(" AND price <= ").push_bind(price_max);
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(available) = filters.available {
            if available {
                qb.push(" AND status = ").push_bind(ListingStatus::Available);
            } else {
                qb.push(" AND status <> ").push_bind(ListingStatus::Available);
            }
        }
        if let Some(score_min) = filters.score_min {
            qb.push(" AND score >= ").push_bind(score_min);
        }
        if let Some(geo_filter) = filters.geo {
            let bbox = geo::bounding_box(geo_filter.lat, geo_filter.lng, geo_filter.radius_km);
            qb.push(" AND latitude >= ").push_bind(bbox.min_lat);
            qb.push(" AND latitude <= ").push_bind(bbox.max_lat);
            // Degenerate polar boxes span the full circle; no constraint then
            if bbox.max_lng - bbox.min_lng < 360.0 {
                qb.push(" AND longitude >= ").push_bind(bbox.min_lng);
                qb.push(" AND longitude <= ").push_bind(bbox.max_lng);
            }
        }

        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(cap);

        let rows = qb.build_query_as::<Listing>().fetch_all(&self.pool).await?;

        if rows.len() as i64 == cap {
            tracing::warn!("candidate cap of {} reached, search results may be truncated", cap);
        }

        Ok(rows)
    }

    pub async fn fetch_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    pub async fn insert_listing(&self, new: NewListing) -> Result<Listing, StoreError> {
        let sql = format!(
            "INSERT INTO listings (landlord_id, title, pitch, address, latitude, longitude, \
             price, housing_type, status, photos) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {LISTING_COLUMNS}"
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(new.landlord_id)
            .bind(new.title)
            .bind(new.pitch)
            .bind(new.address)
            .bind(new.latitude)
            .bind(new.longitude)
            .bind(new.price)
            .bind(new.housing_type)
            .bind(new.status)
            .bind(new.photos)
            .fetch_one(&self.pool)
            .await?;
        Ok(listing)
    }

    pub async fn update_listing(
        &self,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Option<Listing>, StoreError> {
        if patch.is_empty() {
            return self.fetch_listing(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE listings SET ");
        let mut fields = qb.separated(", ");
        if let Some(title) = patch.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(pitch) = patch.pitch {
            fields.push("pitch = ").push_bind_unseparated(pitch);
        }
        if let Some(address) = patch.address {
            fields.push("address = ").push_bind_unseparated(address);
        }
        if let Some(latitude) = patch.latitude {
            fields.push("latitude = ").push_bind_unseparated(latitude);
        }
        if let Some(longitude) = patch.longitude {
            fields.push("longitude = ").push_bind_unseparated(longitude);
        }
        if let Some(price) = patch.price {
            fields.push("price = ").push_bind_unseparated(price);
        }
        if let Some(housing_type) = patch.housing_type {
            fields.push("housing_type = ").push_bind_unseparated(housing_type);
        }
        if let Some(status) = patch.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(photos) = patch.photos {
            fields.push("photos = ").push_bind_unseparated(photos);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {LISTING_COLUMNS}"));

        let listing = qb
            .build_query_as::<Listing>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    /// Soft delete: the row is kept but no longer offered. Refused while
    /// pending or confirmed reservations exist.
    pub async fn deactivate_listing(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM listings WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(StoreError::NotFound(format!("listing {id}")));
        }

        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations \
             WHERE listing_id = $1 AND status IN ('en_attente', 'confirmee'))",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if has_active {
            return Err(StoreError::Conflict(
                "listing has active reservations".to_string(),
            ));
        }

        sqlx::query("UPDATE listings SET status = 'indisponible' WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_listing_score(&self, id: Uuid, score: f64) -> Result<(), StoreError> {
        sqlx::query("UPDATE listings SET score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- accounts ----

    pub async fn fetch_tenant(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT id, name, email, university, is_active, created_at \
             FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    pub async fn fetch_landlord(&self, id: Uuid) -> Result<Option<Landlord>, StoreError> {
        let landlord = sqlx::query_as::<_, Landlord>(
            "SELECT id, name, email, phone, is_active, created_at \
             FROM landlords WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(landlord)
    }

    // ---- preferences ----

    pub async fn fetch_preferences(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<TenantPreference>, StoreError> {
        let preferences = sqlx::query_as::<_, TenantPreference>(
            "SELECT id, tenant_id, housing_type, budget_min, budget_max, radius_km, notes \
             FROM tenant_preferences WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(preferences)
    }

    /// One preference row per tenant: INSERT ... ON CONFLICT keeps the
    /// create-or-replace semantics in a single statement.
    pub async fn upsert_preferences(
        &self,
        new: NewPreference,
    ) -> Result<TenantPreference, StoreError> {
        let preference = sqlx::query_as::<_, TenantPreference>(
            "INSERT INTO tenant_preferences \
             (tenant_id, housing_type, budget_min, budget_max, radius_km, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (tenant_id) DO UPDATE SET \
                 housing_type = EXCLUDED.housing_type, \
                 budget_min = EXCLUDED.budget_min, \
                 budget_max = EXCLUDED.budget_max, \
                 radius_km = EXCLUDED.radius_km, \
                 notes = EXCLUDED.notes \
             RETURNING id, tenant_id, housing_type, budget_min, budget_max, radius_km, notes",
        )
        .bind(new.tenant_id)
        .bind(new.housing_type)
        .bind(new.budget_min)
        .bind(new.budget_max)
        .bind(new.radius_km)
        .bind(new.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(preference)
    }

    // ---- reviews ----

    pub async fn insert_review(&self, new: NewReview) -> Result<Review, StoreError> {
        let sql = format!(
            "INSERT INTO reviews (tenant_id, landlord_id, listing_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REVIEW_COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(new.tenant_id)
            .bind(new.landlord_id)
            .bind(new.listing_id)
            .bind(new.rating)
            .bind(new.comment)
            .fetch_one(&self.pool)
            .await?;
        Ok(review)
    }

    pub async fn list_reviews(
        &self,
        filters: &ReviewFilters,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Review>, usize), StoreError> {
        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM reviews WHERE 1 = 1");
        push_review_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE 1 = 1"));
        push_review_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit as i64);
        qb.push(" OFFSET ").push_bind((page.saturating_sub(1) * limit) as i64);

        let rows = qb.build_query_as::<Review>().fetch_all(&self.pool).await?;
        Ok((rows, total as usize))
    }

    /// All reviews of one listing, newest first.
    pub async fn fetch_listing_reviews(&self, listing_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE listing_id = $1 ORDER BY created_at DESC"
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(listing_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    pub async fn fetch_ratings(&self, listing_id: Uuid) -> Result<Vec<i16>, StoreError> {
        let ratings = sqlx::query_scalar("SELECT rating FROM reviews WHERE listing_id = $1")
            .bind(listing_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    pub async fn has_review_from_tenant(
        &self,
        listing_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE listing_id = $1 AND tenant_id = $2)",
        )
        .bind(listing_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn has_review_from_landlord(
        &self,
        listing_id: Uuid,
        landlord_id: Uuid,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE listing_id = $1 AND landlord_id = $2)",
        )
        .bind(listing_id)
        .bind(landlord_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // ---- reservations ----

    pub async fn list_reservations(
        &self,
        filters: &ReservationFilters,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Reservation>, usize), StoreError> {
        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM reservations WHERE 1 = 1");
        push_reservation_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE 1 = 1"
        ));
        push_reservation_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit as i64);
        qb.push(" OFFSET ").push_bind((page.saturating_sub(1) * limit) as i64);

        let rows = qb
            .build_query_as::<Reservation>()
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total as usize))
    }

    pub async fn tenant_has_overlapping_reservation(
        &self,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations \
             WHERE tenant_id = $1 \
               AND status IN ('en_attente', 'confirmee') \
               AND start_date <= $3 AND end_date >= $2)",
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a reservation and flip the listing to reserved in one
    /// transaction. The status transition is a conditional update, so two
    /// concurrent requests for the same listing cannot both succeed.
    pub async fn create_reservation(
        &self,
        new: NewReservation,
    ) -> Result<Reservation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            "UPDATE listings SET status = 'reserve' WHERE id = $1 AND status = 'disponible'",
        )
        .bind(new.listing_id)
        .execute(&mut *tx)
        .await?;
        if reserved.rows_affected() == 0 {
            return Err(StoreError::Conflict("listing is not available".to_string()));
        }

        let sql = format!(
            "INSERT INTO reservations \
             (tenant_id, listing_id, amount, start_date, end_date, contract_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {RESERVATION_COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(new.tenant_id)
            .bind(new.listing_id)
            .bind(new.amount)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(new.contract_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    /// Apply a status transition. Cancelling releases the listing back to
    /// available, with the same conditional-update idiom as reserving.
    pub async fn update_reservation_status(
        &self,
        id: Uuid,
        next: ReservationStatus,
    ) -> Result<Reservation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE"
        );
        let current = sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("reservation {id}")))?;

        if !current.status.can_transition(next) {
            return Err(StoreError::Conflict(format!(
                "cannot change a {:?} reservation to {:?}",
                current.status, next
            )));
        }

        let sql = format!(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        if next == ReservationStatus::Cancelled {
            sqlx::query(
                "UPDATE listings SET status = 'disponible' WHERE id = $1 AND status = 'reserve'",
            )
            .bind(current.listing_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    // ---- health ----

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn push_review_filters(qb: &mut QueryBuilder<Postgres>, filters: &ReviewFilters) {
    if let Some(listing_id) = filters.listing_id {
        qb.push(" AND listing_id = ").push_bind(listing_id);
    }
    if let Some(tenant_id) = filters.tenant_id {
        qb.push(" AND tenant_id = ").push_bind(tenant_id);
    }
    if let Some(landlord_id) = filters.landlord_id {
        qb.push(" AND landlord_id = ").push_bind(landlord_id);
    }
    if let Some(rating_min) = filters.rating_min {
        qb.push(" AND rating >= ").push_bind(rating_min);
    }
    if let Some(rating_max) = filters.rating_max {
        qb.push(" AND rating <= ").push_bind(rating_max);
    }
}

fn push_reservation_filters(qb: &mut QueryBuilder<Postgres>, filters: &ReservationFilters) {
    if let Some(tenant_id) = filters.tenant_id {
        qb.push(" AND tenant_id = ").push_bind(tenant_id);
    }
    if let Some(listing_id) = filters.listing_id {
        qb.push(" AND listing_id = ").push_bind(listing_id);
    }
    if let Some(status) = filters.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(start_from) = filters.start_from {
        qb.push(" AND start_date >= ").push_bind(start_from);
    }
    if let Some(end_until) = filters.end_until {
        qb.push(" AND end_date <= ").push_bind(end_until);
    }
}
