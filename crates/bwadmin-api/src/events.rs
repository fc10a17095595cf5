//! Organization event logs.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{error::read_json, ApiError, Configuration, Event, ListResponse};

/// Fetch one page of events in the given date range.
pub async fn list_events(
    config: &Configuration,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    continuation_token: Option<&str>,
) -> Result<ListResponse<Event>, ApiError> {
    let mut query = vec![
        ("start", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
    ];
    if let Some(token) = continuation_token {
        query.push(("continuationToken", token.to_owned()));
    }

    let response = config
        .request(reqwest::Method::GET, "/public/events")
        .query(&query)
        .send()
        .await?;

    read_json(response).await
}

/// Fetch every event in the date range, following continuation tokens until
/// the server stops returning one.
pub async fn list_all_events(
    config: &Configuration,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Event>, ApiError> {
    let mut events = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = list_events(config, start, end, token.as_deref()).await?;
        events.extend(page.data);

        match page.continuation_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
        tracing::debug!(fetched = events.len(), "following events continuation token");
    }

    Ok(events)
}

/// Human description of a numeric event type code.
pub fn event_type_text(code: i32) -> &'static str {
    match code {
        1000 => "Logged In.",
        1001 => "Changed account password.",
        1002 => "Enabled/updated two-step login.",
        1003 => "Disabled two-step login.",
        1004 => "Recovered account from two-step login.",
        1005 => "Login attempt failed with incorrect password.",
        1006 => "Login attempt failed with incorrect two-step login.",
        1007 => "User exported their individual vault items.",
        1008 => "User updated a password issued through account recovery.",
        1009 => "User migrated their decryption key with Key Connector.",
        1010 => "User requested device approval.",
        1100 => "Created item.",
        1101 => "Edited item.",
        1102 => "Permanently deleted item.",
        1103 => "Created attachment for item.",
        1104 => "Deleted attachment for item.",
        1105 => "Moved item to an organization.",
        1106 => "Edited collections for item.",
        1107 => "Viewed item.",
        1108 => "Viewed password for item.",
        1109 => "Viewed hidden field for item.",
        1110 => "Viewed security code for item.",
        1111 => "Copied password for item.",
        1112 => "Copied hidden field for item.",
        1113 => "Copied security code for item.",
        1114 => "Autofilled item.",
        1115 => "Sent item to trash.",
        1116 => "Restored item.",
        1117 => "Viewed Card Number for item.",
        1300 => "Created collection.",
        1301 => "Edited collection.",
        1302 => "Deleted collection.",
        1400 => "Created group.",
        1401 => "Edited group.",
        1402 => "Deleted group.",
        1500 => "Invited user.",
        1501 => "Confirmed user.",
        1502 => "Edited user.",
        1503 => "Removed user.",
        1504 => "Edited groups for user.",
        1505 => "Unlinked SSO for user.",
        1506 => "User enrolled in account recovery.",
        1507 => "User withdrew from account recovery.",
        1508 => "Master Password reset for user.",
        1509 => "Reset SSO link for user.",
        1510 => "User logged in using SSO for the first time.",
        1511 => "Revoked organization access for user.",
        1512 => "Restored organization access for user.",
        1513 => "Approved device for user.",
        1514 => "Denied device for user.",
        1600 => "Edited organization settings.",
        1601 => "Purged organization vault.",
        1602 => "Exported organization vault.",
        1603 => "Organization Vault access by a managing Provider.",
        1604 => "Organization enabled SSO.",
        1605 => "Organization disabled SSO.",
        1606 => "Organization enabled Key Connector.",
        1607 => "Organization disabled Key Connector.",
        1608 => "Families Sponsorships synced.",
        1609 => "Modified collection management setting.",
        1700 => "Modified policy.",
        2000 => "Added domain.",
        2001 => "Removed domain.",
        2002 => "Domain verified.",
        2003 => "Domain not verified.",
        _ => "Unknown event type.",
    }
}

/// Label for a numeric device type code.
pub fn device_label(device: Option<i32>) -> String {
    let label = match device {
        Some(0) => "Android",
        Some(1) => "iOS",
        Some(2) => "Chrome Extension",
        Some(3) => "Firefox Extension",
        Some(4) => "Opera Extension",
        Some(5) => "Edge Extension",
        Some(6) => "Windows",
        Some(7) => "macOS",
        Some(8) => "Linux",
        Some(9) => "Chrome",
        Some(10) => "Firefox",
        Some(11) => "Opera",
        Some(12) => "Edge",
        Some(13) => "Internet Explorer",
        Some(14) => "Unknown Browser",
        Some(15) => "Android (Amazon)",
        Some(16) => "UWP",
        Some(17) => "Safari",
        Some(18) => "Vivaldi",
        Some(19) => "Vivaldi Extension",
        Some(20) => "Safari Extension",
        Some(21) => "SDK",
        Some(22) => "Server",
        Some(23) => "Windows CLI",
        Some(24) => "MacOs CLI",
        Some(25) => "Linux CLI",
        other => {
            return match other {
                Some(code) => format!("Unknown Device Type ({code})"),
                None => "Unknown Device Type".to_owned(),
            }
        }
    };
    label.to_owned()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn event_json(code: i32) -> serde_json::Value {
        serde_json::json!({
            "object": "event",
            "type": code,
            "actingUserId": "00000000-0000-0000-0000-000000000001",
            "date": "2024-11-11T12:00:00.000Z",
            "device": 9,
            "ipAddress": "192.0.2.1"
        })
    }

    #[tokio::test]
    async fn follows_continuation_tokens_until_exhausted() {
        let server = MockServer::start().await;

        // First page: no token in the query, returns one.
        Mock::given(method("GET"))
            .and(path("/public/events"))
            .and(query_param("continuationToken", "next-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [event_json(1101)],
                "continuationToken": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/public/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [event_json(1000), event_json(1100)],
                "continuationToken": "next-1"
            })))
            .mount(&server)
            .await;

        let mut config = Configuration::new(server.uri());
        config.oauth_access_token = Some("tok".to_owned());

        let start = "2024-11-01T00:00:00Z".parse().expect("date");
        let end = "2024-11-30T00:00:00Z".parse().expect("date");
        let events = list_all_events(&config, start, end).await.expect("events");

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].r#type, 1000);
        assert_eq!(events[2].r#type, 1101);
    }

    #[tokio::test]
    async fn sends_bearer_token_and_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/events"))
            .and(query_param("start", "2024-11-01T00:00:00.000Z"))
            .and(wiremock::matchers::header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [],
                "continuationToken": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = Configuration::new(server.uri());
        config.oauth_access_token = Some("tok".to_owned());

        let start = "2024-11-01T00:00:00Z".parse().expect("date");
        let end = "2024-11-30T00:00:00Z".parse().expect("date");
        let page = list_events(&config, start, end, None).await.expect("page");
        assert!(page.data.is_empty());
    }

    #[test]
    fn type_and_device_labels() {
        assert_eq!(event_type_text(1107), "Viewed item.");
        assert_eq!(event_type_text(-1), "Unknown event type.");
        assert_eq!(device_label(Some(9)), "Chrome");
        assert_eq!(device_label(Some(99)), "Unknown Device Type (99)");
        assert_eq!(device_label(None), "Unknown Device Type");
    }
}
