use serde_json::Value;
use tracing::{error, warn};

/// cmi5 launch parameters as passed on the launch URL query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchParams {
    pub endpoint: Option<String>,
    pub auth: Option<String>,
    pub activity_id: Option<String>,
    pub registration: Option<String>,
    pub actor: Option<Value>,
}

impl LaunchParams {
    /// Parse `endpoint`, `auth`, `activityId`, `registration`, and `actor`
    /// out of a query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut params = LaunchParams::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(raw);
            if value.is_empty() {
                continue;
            }
            match key {
                "endpoint" => params.endpoint = Some(value),
                "auth" => params.auth = Some(value),
                "activityId" => params.activity_id = Some(value),
                "registration" => params.registration = Some(value),
                "actor" => match serde_json::from_str(&value) {
                    Ok(actor) => params.actor = Some(actor),
                    Err(e) => error!(error = %e, "failed to parse actor parameter"),
                },
                _ => {}
            }
        }

        if params.is_standalone() {
            warn!("missing cmi5 launch parameters, running in standalone mode");
        }
        params
    }

    /// Without an endpoint, credentials, and an activity there is no LRS to talk to.
    pub fn is_standalone(&self) -> bool {
        self.endpoint.is_none() || self.auth.is_none() || self.activity_id.is_none()
    }

    pub fn activity_id_or_default(&self) -> &str {
        self.activity_id
            .as_deref()
            .unwrap_or("https://scadamon.training/activities/standalone")
    }
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match hex {
                    Some(byte) => {
                        decoded.push(byte);
                        i += 2;
                    }
                    None => decoded.push(b'%'),
                }
            }
            other => decoded.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_launch_query() {
        let query = "?endpoint=https%3A%2F%2Flrs.example%2Fxapi&auth=Basic%20abc&activityId=act-1\
                     &registration=reg-9&actor=%7B%22name%22%3A%22Ada%22%7D";
        let params = LaunchParams::from_query(query);

        assert_eq!(params.endpoint.as_deref(), Some("https://lrs.example/xapi"));
        assert_eq!(params.auth.as_deref(), Some("Basic abc"));
        assert_eq!(params.registration.as_deref(), Some("reg-9"));
        assert_eq!(params.actor, Some(serde_json::json!({ "name": "Ada" })));
        assert!(!params.is_standalone());
    }

    #[test]
    fn test_missing_auth_is_standalone() {
        let params = LaunchParams::from_query("endpoint=x&activityId=y");
        assert!(params.is_standalone());
    }

    #[test]
    fn test_bad_actor_is_dropped() {
        let params = LaunchParams::from_query("actor=%7Bnope");
        assert_eq!(params.actor, None);
        assert!(params.is_standalone());
    }

    #[test]
    fn test_percent_decode_keeps_stray_percent() {
        assert_eq!(percent_decode("100%25"), "100%");
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
