//! Organization groups.

use uuid::Uuid;

use crate::{error::read_json, ApiError, Configuration, Group, ListResponse};

/// List the organization's groups.
pub async fn list_groups(config: &Configuration) -> Result<Vec<Group>, ApiError> {
    let response = config
        .request(reqwest::Method::GET, "/public/groups")
        .send()
        .await?;

    let list: ListResponse<Group> = read_json(response).await?;
    Ok(list.data)
}

/// Retrieve one group, including its collection grants.
pub async fn get_group(config: &Configuration, id: Uuid) -> Result<Group, ApiError> {
    let response = config
        .request(reqwest::Method::GET, &format!("/public/groups/{id}"))
        .send()
        .await?;

    read_json(response).await
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn lists_groups_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "55555555-5555-5555-5555-555555555555", "name": "Engineering"}
                ],
                "continuationToken": null
            })))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let groups = list_groups(&config).await.expect("groups");

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name.as_deref(), Some("Engineering"));
    }
}
