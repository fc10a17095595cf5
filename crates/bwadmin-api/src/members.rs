//! Organization members.

use uuid::Uuid;

use crate::{error::read_json, ApiError, Configuration, ListResponse, Member};

/// List the organization's members.
pub async fn list_members(config: &Configuration) -> Result<Vec<Member>, ApiError> {
    let response = config
        .request(reqwest::Method::GET, "/public/members")
        .send()
        .await?;

    let list: ListResponse<Member> = read_json(response).await?;
    Ok(list.data)
}

/// Retrieve one member, including their collection grants.
pub async fn get_member(config: &Configuration, id: Uuid) -> Result<Member, ApiError> {
    let response = config
        .request(reqwest::Method::GET, &format!("/public/members/{id}"))
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
    async fn lists_members_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {
                        "id": "11111111-1111-1111-1111-111111111111",
                        "userId": "22222222-2222-2222-2222-222222222222",
                        "name": "Jane Smith",
                        "email": "jane@example.com"
                    },
                    {
                        "id": "33333333-3333-3333-3333-333333333333",
                        "userId": null,
                        "name": null,
                        "email": "invited@example.com"
                    }
                ],
                "continuationToken": null
            })))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let members = list_members(&config).await.expect("members");

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name.as_deref(), Some("Jane Smith"));
        assert_eq!(members[1].user_id, None);
    }

    #[tokio::test]
    async fn member_details_carry_collection_grants() {
        let id: Uuid = "11111111-1111-1111-1111-111111111111"
            .parse()
            .expect("uuid");

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/public/members/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": id,
                "email": "jane@example.com",
                "collections": [
                    {
                        "id": "44444444-4444-4444-4444-444444444444",
                        "readOnly": true,
                        "hidePasswords": false,
                        "manage": false
                    }
                ]
            })))
            .mount(&server)
            .await;

        let config = Configuration::new(server.uri());
        let member = get_member(&config, id).await.expect("member");

        let grants = member.collections.expect("grants");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].permission_text(), "Can View");
    }
}
