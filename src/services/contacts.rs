//! Contact operations.

use serde::{Deserialize, Serialize};

use crate::client::{decode_response, HubSpotClient};
use crate::context::ExecutionContext;
use crate::errors::{ApiError, HubSpotError, HubSpotResult};
use crate::types::{Contact, Properties};

const CONTACTS_PATH: &str = "crm/v3/objects/contacts";

/// Request body for creating or updating a contact.
#[derive(Debug, Clone, Serialize)]
struct ContactRequest<'a> {
    properties: &'a Properties,
}

/// A single search filter condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// Property the filter applies to.
    #[serde(rename = "propertyName")]
    pub property_name: String,
    /// Comparison operator, e.g. `EQ`.
    pub operator: String,
    /// Value to compare against.
    pub value: String,
}

/// A group of filters combined with AND semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterGroup {
    /// Filters in this group.
    pub filters: Vec<Filter>,
}

/// Search request over the contacts collection.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSearchRequest {
    /// Filter groups combined with OR semantics.
    #[serde(rename = "filterGroups")]
    pub filter_groups: Vec<FilterGroup>,
    /// Properties to return, all when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

/// Search response from the contacts collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactSearchResponse {
    /// Matching contacts.
    pub results: Vec<Contact>,
    /// Total match count.
    pub total: u64,
}

/// Service for contact operations.
pub struct ContactsService<'a> {
    client: &'a HubSpotClient,
}

impl<'a> ContactsService<'a> {
    /// Creates a new contacts service.
    pub fn new(client: &'a HubSpotClient) -> Self {
        Self { client }
    }

    /// Creates a contact.
    pub async fn create(
        &self,
        ctx: &ExecutionContext,
        properties: &Properties,
    ) -> HubSpotResult<Contact> {
        let request = ContactRequest { properties };
        let response = self.client.post(ctx, CONTACTS_PATH, &request).await?;
        decode_response(response).await
    }

    /// Gets a contact by ID.
    pub async fn get(&self, ctx: &ExecutionContext, id: &str) -> HubSpotResult<Contact> {
        let response = self
            .client
            .get(ctx, &format!("{CONTACTS_PATH}/{id}"))
            .await?;
        decode_response(response).await
    }

    /// Updates an existing contact.
    pub async fn update(
        &self,
        ctx: &ExecutionContext,
        id: &str,
        properties: &Properties,
    ) -> HubSpotResult<Contact> {
        let request = ContactRequest { properties };
        let response = self
            .client
            .patch(ctx, &format!("{CONTACTS_PATH}/{id}"), &request)
            .await?;
        decode_response(response).await
    }

    /// Deletes a contact by ID.
    pub async fn delete(&self, ctx: &ExecutionContext, id: &str) -> HubSpotResult<()> {
        self.client
            .delete(ctx, &format!("{CONTACTS_PATH}/{id}"))
            .await?;
        Ok(())
    }

    /// Searches contacts with arbitrary filters.
    pub async fn search(
        &self,
        ctx: &ExecutionContext,
        request: &ContactSearchRequest,
    ) -> HubSpotResult<ContactSearchResponse> {
        let response = self
            .client
            .post(ctx, &format!("{CONTACTS_PATH}/search"), request)
            .await?;
        decode_response(response).await
    }

    /// Gets a contact by email address using the search API.
    ///
    /// An empty search result surfaces as a not-found error so callers can
    /// treat it the same way as a missing ID.
    pub async fn get_by_email(
        &self,
        ctx: &ExecutionContext,
        email: &str,
    ) -> HubSpotResult<Contact> {
        let request = ContactSearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: "email".to_string(),
                    operator: "EQ".to_string(),
                    value: email.to_string(),
                }],
            }],
            properties: Vec::new(),
        };

        let mut response = self.search(ctx, &request).await?;
        if response.total == 0 || response.results.is_empty() {
            return Err(HubSpotError::Api(ApiError::not_found(format!(
                "contact with email {email} not found"
            ))));
        }

        Ok(response.results.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_wire_shape() {
        let request = ContactSearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: "email".to_string(),
                    operator: "EQ".to_string(),
                    value: "ada@example.com".to_string(),
                }],
            }],
            properties: Vec::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filterGroups": [
                    {"filters": [{"propertyName": "email", "operator": "EQ", "value": "ada@example.com"}]}
                ]
            })
        );
    }

    #[test]
    fn test_search_response_decodes() {
        let response: ContactSearchResponse = serde_json::from_str(
            r#"{
                "results": [{
                    "id": "51",
                    "properties": {"email": "ada@example.com"},
                    "createdAt": "2024-03-01T12:00:00Z",
                    "updatedAt": "2024-03-02T08:30:00Z"
                }],
                "total": 1
            }"#,
        )
        .unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.results[0].id, "51");
    }
}
