//! Blocking HTTP implementation of `ResourceClient`

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{Fetch, ResourceClient};
use crate::model::{MoveInfo, PokemonInfo, TypeInfo};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("dexload/", env!("CARGO_PKG_VERSION"));

/// Settings for building an `HttpClient`
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ========== Wire types ==========

#[derive(Debug, Deserialize)]
struct NamedRef {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    type_ref: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct MoveSlot {
    #[serde(rename = "move")]
    move_ref: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct PokemonBody {
    name: Option<String>,
    weight: Option<i64>,
    types: Option<Vec<Option<TypeSlot>>>,
    moves: Option<Vec<Option<MoveSlot>>>,
}

#[derive(Debug, Deserialize)]
struct TypeBody {
    id: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoveBody {
    id: Option<i64>,
    name: Option<String>,
    accuracy: Option<i64>,
}

fn url_of(named: Option<NamedRef>) -> Option<String> {
    named.and_then(|n| n.url)
}

/// PokeAPI client over `reqwest::blocking`.
///
/// One request per call: no retries, no pagination. The configured timeout
/// bounds every request.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn pokemon_url(&self, id: i64) -> String {
        format!("{}/pokemon/{}", self.base_url, id)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Fetch<T>> {
        debug!("GET {}", url);
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => return Ok(Fetch::TransientError(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            debug!("{} returned {}", url, status);
            return Ok(Fetch::NotFound);
        }

        let text = match response.text() {
            Ok(text) => text,
            Err(e) => return Ok(Fetch::TransientError(e.to_string())),
        };

        let body = serde_json::from_str(&text).map_err(|e| Error::Malformed {
            locator: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Fetch::Resolved(body))
    }
}

fn require_id(id: Option<i64>, url: &str) -> Result<i64> {
    id.ok_or_else(|| Error::Malformed {
        locator: url.to_string(),
        reason: "missing id".to_string(),
    })
}

impl ResourceClient for HttpClient {
    fn fetch_pokemon(&self, id: i64) -> Result<Fetch<PokemonInfo>> {
        let url = self.pokemon_url(id);
        let fetched: Fetch<PokemonBody> = self.get_json(&url)?;
        Ok(fetched.map(|body| PokemonInfo {
            id,
            name: body.name,
            weight: body.weight,
            type_refs: body
                .types
                .unwrap_or_default()
                .into_iter()
                .map(|slot| url_of(slot.and_then(|s| s.type_ref)))
                .collect(),
            move_refs: body
                .moves
                .unwrap_or_default()
                .into_iter()
                .map(|slot| url_of(slot.and_then(|s| s.move_ref)))
                .collect(),
        }))
    }

    fn fetch_type(&self, url: &str) -> Result<Fetch<TypeInfo>> {
        match self.get_json::<TypeBody>(url)? {
            Fetch::Resolved(body) => Ok(Fetch::Resolved(TypeInfo {
                id: require_id(body.id, url)?,
                name: body.name,
            })),
            Fetch::NotFound => Ok(Fetch::NotFound),
            Fetch::TransientError(e) => Ok(Fetch::TransientError(e)),
        }
    }

    fn fetch_move(&self, url: &str) -> Result<Fetch<MoveInfo>> {
        match self.get_json::<MoveBody>(url)? {
            Fetch::Resolved(body) => Ok(Fetch::Resolved(MoveInfo {
                id: require_id(body.id, url)?,
                name: body.name,
                accuracy: body.accuracy,
            })),
            Fetch::NotFound => Ok(Fetch::NotFound),
            Fetch::TransientError(e) => Ok(Fetch::TransientError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_server(rt: &Runtime) -> MockServer {
        rt.block_on(MockServer::start())
    }

    fn mount(rt: &Runtime, server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
        rt.block_on(
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_json(body))
                .mount(server),
        );
    }

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(ClientOptions {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            ..ClientOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fetch_pokemon_keeps_null_references() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        mount(
            &rt,
            &server,
            "/pokemon/1",
            200,
            json!({
                "id": 1,
                "name": "bulbasaur",
                "weight": 69,
                "types": [
                    {"slot": 1, "type": {"name": "grass", "url": "https://example.test/type/12/"}},
                    {"slot": 2, "type": null},
                    {"slot": 3}
                ],
                "moves": [
                    {"move": {"name": "razor-wind", "url": "https://example.test/move/13/"}}
                ]
            }),
        );

        let client = client_for(&server);
        let Fetch::Resolved(p) = client.fetch_pokemon(1).unwrap() else {
            panic!("expected resolved");
        };
        assert_eq!(p.id, 1);
        assert_eq!(p.name.as_deref(), Some("bulbasaur"));
        assert_eq!(p.weight, Some(69));
        assert_eq!(
            p.type_refs,
            vec![Some("https://example.test/type/12/".to_string()), None, None]
        );
        assert_eq!(p.move_refs.len(), 1);
    }

    #[test]
    fn test_missing_lists_decode_as_empty() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        mount(&rt, &server, "/pokemon/7", 200, json!({"name": "squirtle"}));

        let client = client_for(&server);
        let Fetch::Resolved(p) = client.fetch_pokemon(7).unwrap() else {
            panic!("expected resolved");
        };
        assert_eq!(p.weight, None);
        assert!(p.type_refs.is_empty());
        assert!(p.move_refs.is_empty());
    }

    #[test]
    fn test_non_success_is_not_found() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        mount(&rt, &server, "/pokemon/999", 404, json!({"detail": "Not found."}));

        let client = client_for(&server);
        assert_eq!(client.fetch_pokemon(999).unwrap(), Fetch::NotFound);
    }

    #[test]
    fn test_fetch_type_and_move_by_url() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        mount(&rt, &server, "/type/12/", 200, json!({"id": 12, "name": "grass"}));
        mount(&rt, &server, "/move/14/", 200, json!({"id": 14, "name": "swords-dance", "accuracy": null}));

        let client = client_for(&server);
        let type_url = format!("{}/type/12/", server.uri());
        let move_url = format!("{}/move/14/", server.uri());

        assert_eq!(
            client.fetch_type(&type_url).unwrap(),
            Fetch::Resolved(TypeInfo { id: 12, name: Some("grass".into()) })
        );
        assert_eq!(
            client.fetch_move(&move_url).unwrap(),
            Fetch::Resolved(MoveInfo { id: 14, name: Some("swords-dance".into()), accuracy: None })
        );
    }

    #[test]
    fn test_type_without_id_is_malformed() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        mount(&rt, &server, "/type/99/", 200, json!({"name": "mystery"}));

        let client = client_for(&server);
        let err = client.fetch_type(&format!("{}/type/99/", server.uri())).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_pokemon_body_not_json_is_malformed() {
        let rt = Runtime::new().unwrap();
        let server = mock_server(&rt);
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/pokemon/3"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
                .mount(&server),
        );

        let client = client_for(&server);
        let err = client.fetch_pokemon(3).unwrap_err();
        match err {
            Error::Malformed { locator, .. } => assert!(locator.ends_with("/pokemon/3")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_host_is_transient() {
        let client = HttpClient::new(ClientOptions {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..ClientOptions::default()
        })
        .unwrap();

        assert!(matches!(client.fetch_pokemon(1).unwrap(), Fetch::TransientError(_)));
    }
}
