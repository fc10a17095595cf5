//! Organization collections.

use crate::{error::read_json, ApiError, Collection, Configuration, ListResponse};

/// List the organization's collections. Only ids and external ids are
/// exposed here; display names are encrypted and come from the CLI.
pub async fn list_collections(config: &Configuration) -> Result<Vec<Collection>, ApiError> {
    let response = config
        .request(reqwest::Method::GET, "/public/collections")
        .send()
        .await?;

    let list: ListResponse<Collection> = read_json(response).await?;
    Ok(list.data)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn lists_collections_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "66666666-6666-6666-6666-666666666666", "externalId": "eng"}
                ],
                "continuationToken": null
            })))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let collections = list_collections(&config).await.expect("collections");

        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].external_id.as_deref(), Some("eng"));
    }
}
