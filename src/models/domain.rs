use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Housing type of a listing. Wire values keep the French labels the
/// frontend already consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "housing_type")]
pub enum HousingType {
    #[serde(rename = "Studio")]
    #[sqlx(rename = "Studio")]
    Studio,
    #[serde(rename = "Appartement")]
    #[sqlx(rename = "Appartement")]
    Apartment,
    #[serde(rename = "Maison")]
    #[sqlx(rename = "Maison")]
    House,
}

impl FromStr for HousingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Studio" => Ok(Self::Studio),
            "Appartement" => Ok(Self::Apartment),
            "Maison" => Ok(Self::House),
            other => Err(format!(
                "invalid housing type '{other}', expected Studio, Appartement or Maison"
            )),
        }
    }
}

/// Lifecycle status of a listing. This is the single source of truth for
/// availability; the `disponible` boolean in responses is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status")]
pub enum ListingStatus {
    #[serde(rename = "disponible")]
    #[sqlx(rename = "disponible")]
    Available,
    #[serde(rename = "reserve")]
    #[sqlx(rename = "reserve")]
    Reserved,
    #[serde(rename = "indisponible")]
    #[sqlx(rename = "indisponible")]
    Unavailable,
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disponible" => Ok(Self::Available),
            "reserve" => Ok(Self::Reserved),
            "indisponible" => Ok(Self::Unavailable),
            other => Err(format!(
                "invalid listing status '{other}', expected disponible, reserve or indisponible"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status")]
pub enum ReservationStatus {
    #[serde(rename = "en_attente")]
    #[sqlx(rename = "en_attente")]
    Pending,
    #[serde(rename = "confirmee")]
    #[sqlx(rename = "confirmee")]
    Confirmed,
    #[serde(rename = "annulee")]
    #[sqlx(rename = "annulee")]
    Cancelled,
    #[serde(rename = "terminee")]
    #[sqlx(rename = "terminee")]
    Completed,
}

impl ReservationStatus {
    /// Allowed lifecycle transitions. Cancelled and completed are terminal.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_attente" => Ok(Self::Pending),
            "confirmee" => Ok(Self::Confirmed),
            "annulee" => Ok(Self::Cancelled),
            "terminee" => Ok(Self::Completed),
            other => Err(format!(
                "invalid reservation status '{other}', expected en_attente, confirmee, annulee or terminee"
            )),
        }
    }
}

/// A rentable housing unit, owned by a landlord.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: Uuid,
    #[serde(rename = "bailleur_id")]
    pub landlord_id: Uuid,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "accroche")]
    pub pitch: Option<String>,
    #[serde(rename = "adresse")]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Monthly rent in whole euros.
    #[serde(rename = "prix")]
    pub price: i32,
    #[serde(rename = "type_logement")]
    pub housing_type: HousingType,
    #[serde(rename = "statut_logement")]
    pub status: ListingStatus,
    /// Running mean of review ratings, 0 to 5, one decimal.
    pub score: f64,
    pub photos: Vec<String>,
    #[serde(rename = "date_ajout")]
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available
    }
}

/// A prospective renter account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "universite")]
    pub university: Option<String>,
    pub is_active: bool,
    #[serde(rename = "date_inscription")]
    pub created_at: DateTime<Utc>,
}

/// A property-owner account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Landlord {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    pub is_active: bool,
    #[serde(rename = "date_inscription")]
    pub created_at: DateTime<Utc>,
}

/// Stored search preferences of a tenant, one row per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TenantPreference {
    pub id: Uuid,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Uuid,
    #[serde(rename = "type_logement")]
    pub housing_type: HousingType,
    pub budget_min: i32,
    pub budget_max: i32,
    #[serde(rename = "rayon_km")]
    pub radius_km: i32,
    #[serde(rename = "autres_spec")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Uuid,
    #[serde(rename = "logement_id")]
    pub listing_id: Uuid,
    #[serde(rename = "statut_reservation")]
    pub status: ReservationStatus,
    #[serde(rename = "montant_total")]
    pub amount: i32,
    #[serde(rename = "date_debut_location")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "date_fin_location")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "contrat_url")]
    pub contract_url: Option<String>,
    #[serde(rename = "is_paiement_securise")]
    pub secure_payment: bool,
    #[serde(rename = "date_reservation")]
    pub created_at: DateTime<Utc>,
}

/// A review left on a listing. Exactly one of `tenant_id` / `landlord_id`
/// identifies the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "bailleur_id")]
    pub landlord_id: Option<Uuid>,
    #[serde(rename = "logement_id")]
    pub listing_id: Uuid,
    #[serde(rename = "note")]
    pub rating: i16,
    #[serde(rename = "commentaire")]
    pub comment: Option<String>,
    #[serde(rename = "date_avis")]
    pub created_at: DateTime<Utc>,
}

/// Geospatial bounding box, a rectangular approximation of a search circle.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Circular search area, resolved to a bounding box by the geo filter.
#[derive(Debug, Clone, Copy)]
pub struct GeoConstraint {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

/// Structured filter set for a listing search. Every present field is a
/// hard AND constraint; absent fields impose nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingFilters {
    pub housing_type: Option<HousingType>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub status: Option<ListingStatus>,
    /// Boolean availability view, evaluated against the status enum.
    pub available: Option<bool>,
    pub score_min: Option<f64>,
    pub geo: Option<GeoConstraint>,
}

/// Requested result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently added first. The default.
    #[default]
    Newest,
    /// Review score, descending.
    Score,
    PriceAsc,
    PriceDesc,
    /// Compatibility score, descending. Requires a tenant context.
    Compatibility,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_ajout" => Ok(Self::Newest),
            "score" => Ok(Self::Score),
            "prix" => Ok(Self::PriceAsc),
            "prix_desc" => Ok(Self::PriceDesc),
            "compatibility" => Ok(Self::Compatibility),
            other => Err(format!(
                "invalid sort_by '{other}', expected date_ajout, score, prix, prix_desc or compatibility"
            )),
        }
    }
}

/// A candidate listing that survived filtering, with its ephemeral
/// compatibility score when a tenant context was supplied. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredListing {
    pub listing: Listing,
    pub compatibility: Option<u8>,
}
