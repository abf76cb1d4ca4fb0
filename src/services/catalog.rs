use crate::config::CatalogSettings;
use crate::models::{BoundingBox, Organization};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the organization catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Organization catalog client
///
/// Reads organization documents from the document store. The catalog is read-only
/// from this service's point of view; administration happens elsewhere.
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection: String,
    client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collection: String,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            collection,
            client,
        })
    }

    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.project_id.clone(),
            settings.database_id.clone(),
            settings.organizations_collection.clone(),
            Duration::from_secs(settings.timeout_secs.unwrap_or(10)),
        )
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collection
        )
    }

    /// Build the document queries for an organization listing
    ///
    /// Only eligible organizations are requested; the bounding box narrows the
    /// listing to the search area when one is given.
    pub fn build_queries(bbox: Option<&BoundingBox>) -> Vec<String> {
        let mut queries = vec![
            "equal(\"active\", true)".to_string(),
            "equal(\"verified\", true)".to_string(),
        ];

        if let Some(bbox) = bbox {
            queries.push(format!("greaterThanEqual(\"latitude\", {})", bbox.min_lat));
            queries.push(format!("lessThanEqual(\"latitude\", {})", bbox.max_lat));
            queries.push(format!("greaterThanEqual(\"longitude\", {})", bbox.min_lon));
            queries.push(format!("lessThanEqual(\"longitude\", {})", bbox.max_lon));
        }

        queries
    }

    /// List organizations, optionally restricted to a bounding box
    pub async fn list_organizations(
        &self,
        bbox: Option<BoundingBox>,
    ) -> Result<Vec<Organization>, CatalogError> {
        let queries = Self::build_queries(bbox.as_ref());
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to encode queries: {}", e)))?;
        let full_url = format!("{}?query={}", self.documents_url(), urlencoding::encode(&queries_json));

        tracing::debug!("Listing organizations from: {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(CatalogError::Unauthorized),
            status => {
                return Err(CatalogError::ApiError(format!(
                    "Failed to list organizations: {}",
                    status
                )))
            }
        }

        let json: Value = response.json().await?;
        let organizations = parse_documents(&json)?;

        tracing::debug!(
            "Listed {} organizations (total: {})",
            organizations.len(),
            json.get("total").and_then(|t| t.as_u64()).unwrap_or(0)
        );

        Ok(organizations)
    }
}

/// Extract the organization record from a catalog document
///
/// Documents may nest their fields under `data`; the document `$id` is used when
/// the fields carry no id of their own.
fn parse_document(doc: &Value) -> Result<Organization, serde_json::Error> {
    let mut data = doc.get("data").unwrap_or(doc).clone();

    if let (Some(fields), Some(doc_id)) = (data.as_object_mut(), doc.get("$id")) {
        if !fields.contains_key("id") && !fields.contains_key("$id") && !fields.contains_key("_id") {
            fields.insert("id".to_string(), doc_id.clone());
        }
    }

    serde_json::from_value(data)
}

fn parse_documents(json: &Value) -> Result<Vec<Organization>, CatalogError> {
    let documents = json
        .get("documents")
        .and_then(|d| d.as_array())
        .ok_or_else(|| CatalogError::InvalidResponse("Missing documents array".into()))?;

    Ok(documents
        .iter()
        .filter_map(|doc| match parse_document(doc) {
            Ok(org) => match org.location.validate() {
                Ok(()) => Some(org),
                Err(e) => {
                    tracing::warn!("Skipping organization {} with bad coordinates: {}", org.id, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed organization document {}: {}",
                    doc.get("$id").and_then(|id| id.as_str()).unwrap_or("<unknown>"),
                    e
                );
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrganizationCategory;
    use serde_json::json;

    fn create_client(base_url: String) -> CatalogClient {
        CatalogClient::new(
            base_url,
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            "organizations".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_catalog_client_creation() {
        let client = create_client("https://catalog.test/v1/".to_string());

        assert_eq!(
            client.documents_url(),
            "https://catalog.test/v1/databases/test_db/collections/organizations/documents"
        );
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_build_queries() {
        assert_eq!(CatalogClient::build_queries(None).len(), 2);

        let bbox = BoundingBox {
            min_lat: 18.9,
            max_lat: 19.2,
            min_lon: 72.7,
            max_lon: 73.0,
        };
        let queries = CatalogClient::build_queries(Some(&bbox));
        assert_eq!(queries.len(), 6);
        assert!(queries.contains(&"greaterThanEqual(\"latitude\", 18.9)".to_string()));
    }

    #[test]
    fn test_parse_documents_skips_malformed() {
        let json = json!({
            "total": 3,
            "documents": [
                {"$id": "a", "name": "Food Bank India", "organizationType": "food_bank",
                 "latitude": 19.076, "longitude": 72.8777, "capacity": 1000, "verified": true},
                {"$id": "b", "data": {"name": "Nested NGO", "type": "NGO", "lat": 28.61, "lng": 77.20}},
                {"$id": "c", "name": "No coordinates"}
            ]
        });

        let orgs = parse_documents(&json).unwrap();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].id, "a");
        assert_eq!(orgs[0].category, OrganizationCategory::FoodBank);
        assert_eq!(orgs[1].id, "b");
        assert_eq!(orgs[1].category, OrganizationCategory::Ngo);
    }

    #[test]
    fn test_parse_documents_requires_array() {
        assert!(parse_documents(&json!({"total": 0})).is_err());
    }

    #[tokio::test]
    async fn test_list_organizations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Regex("^/databases/test_db/collections/organizations/documents".to_string()))
            .match_query(mockito::Matcher::Any)
            .match_header("X-Appwrite-Key", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 1,
                    "documents": [{"$id": "org-1", "name": "City Food Relief", "type": "charity",
                                   "latitude": 19.08, "longitude": 72.88, "verified": true}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_client(server.url());
        let orgs = client.list_organizations(None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "City Food Relief");
    }

    #[tokio::test]
    async fn test_list_organizations_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("documents".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = create_client(server.url());
        assert!(matches!(client.list_organizations(None).await, Err(CatalogError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_list_organizations_skips_out_of_range_coordinates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("documents".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 2,
                    "documents": [
                        {"$id": "good", "name": "City Food Relief", "type": "charity",
                         "latitude": 19.08, "longitude": 72.88, "verified": true},
                        {"$id": "bad", "name": "Misplaced Shelter", "type": "shelter",
                         "latitude": 19.08, "longitude": 272.88, "verified": true}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = create_client(server.url());
        let orgs = client.list_organizations(None).await.unwrap();

        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].id, "good");
    }
}
