use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Query parameters for GET /api/search. Enum-valued fields arrive as raw
/// strings and are parsed (and rejected) at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type_logement")]
    pub housing_type: Option<String>,
    #[serde(rename = "prix_min")]
    pub price_min: Option<i32>,
    #[serde(rename = "prix_max")]
    pub price_max: Option<i32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub sort_by: Option<String>,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    pub score_min: Option<f64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Query parameters for GET /api/logements. A superset of the search
/// parameters: status and availability can be filtered explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingQueryParams {
    #[serde(rename = "type_logement")]
    pub housing_type: Option<String>,
    #[serde(rename = "prix_min")]
    pub price_min: Option<i32>,
    #[serde(rename = "prix_max")]
    pub price_max: Option<i32>,
    #[serde(rename = "disponible")]
    pub available: Option<bool>,
    #[serde(rename = "statut_logement")]
    pub status: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub sort_by: Option<String>,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    pub score_min: Option<f64>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingDetailQuery {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[serde(rename = "bailleur_id")]
    pub landlord_id: Uuid,
    #[validate(length(min = 1))]
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "accroche")]
    pub pitch: Option<String>,
    #[validate(length(min = 1))]
    #[serde(rename = "adresse")]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(rename = "prix")]
    pub price: i32,
    #[serde(rename = "type_logement")]
    pub housing_type: String,
    #[serde(rename = "statut_logement")]
    pub status: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Partial update for PUT /api/logements/{id}. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateListingRequest {
    #[serde(rename = "titre")]
    pub title: Option<String>,
    #[serde(rename = "accroche")]
    pub pitch: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "prix")]
    pub price: Option<i32>,
    #[serde(rename = "type_logement")]
    pub housing_type: Option<String>,
    #[serde(rename = "statut_logement")]
    pub status: Option<String>,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewListParams {
    #[serde(rename = "logement_id")]
    pub listing_id: Option<Uuid>,
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "bailleur_id")]
    pub landlord_id: Option<Uuid>,
    #[serde(rename = "note_min")]
    pub rating_min: Option<i16>,
    #[serde(rename = "note_max")]
    pub rating_max: Option<i16>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "bailleur_id")]
    pub landlord_id: Option<Uuid>,
    #[serde(rename = "logement_id")]
    pub listing_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    #[serde(rename = "note")]
    pub rating: i16,
    #[serde(rename = "commentaire")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationListParams {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Option<Uuid>,
    #[serde(rename = "logement_id")]
    pub listing_id: Option<Uuid>,
    #[serde(rename = "statut_reservation")]
    pub status: Option<String>,
    #[serde(rename = "date_debut")]
    pub start_from: Option<DateTime<Utc>>,
    #[serde(rename = "date_fin")]
    pub end_until: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Uuid,
    #[serde(rename = "logement_id")]
    pub listing_id: Uuid,
    #[validate(range(min = 1))]
    #[serde(rename = "montant_total")]
    pub amount: i32,
    #[serde(rename = "date_debut_location")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "date_fin_location")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "contrat_url")]
    pub contract_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReservationRequest {
    #[serde(rename = "statut_reservation")]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceQuery {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertPreferencesRequest {
    #[serde(rename = "locataire_id")]
    pub tenant_id: Uuid,
    #[serde(rename = "type_logement")]
    pub housing_type: String,
    #[validate(range(min = 1))]
    pub budget_min: i32,
    #[validate(range(min = 1))]
    pub budget_max: i32,
    #[validate(range(min = 1, max = 100))]
    #[serde(rename = "rayon_km")]
    pub radius_km: i32,
    #[serde(rename = "autres_spec")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_accept_french_keys() {
        let params: SearchParams = serde_urlencoded::from_str(
            "type_logement=Studio&prix_min=300&prix_max=700&sort_by=prix&page=2&limit=20",
        )
        .unwrap();
        assert_eq!(params.housing_type.as_deref(), Some("Studio"));
        assert_eq!(params.price_min, Some(300));
        assert_eq!(params.price_max, Some(700));
        assert_eq!(params.page, Some(2));
        assert_eq!(params.limit, Some(20));
    }

    #[test]
    fn test_review_request_rating_range() {
        let ok = CreateReviewRequest {
            tenant_id: Some(Uuid::new_v4()),
            landlord_id: None,
            listing_id: Uuid::new_v4(),
            rating: 5,
            comment: None,
        };
        assert!(ok.validate().is_ok());

        let out_of_range = CreateReviewRequest { rating: 6, ..ok };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_preferences_request_radius_range() {
        let req = UpsertPreferencesRequest {
            tenant_id: Uuid::new_v4(),
            housing_type: "Studio".to_string(),
            budget_min: 300,
            budget_max: 600,
            radius_km: 150,
            notes: None,
        };
        assert!(req.validate().is_err());
    }
}
