//! `ArgumentsClient` against a scripted in-process transport.
//!
//! The fake records every request it receives, so each test can assert both
//! the outcome and exactly which round-trips happened.

use std::fmt;
use std::sync::{Arc, Mutex};

use arguments_client::{
    ApiError, Argument, ArgumentUpdate, ArgumentsClient, ClientConfig, Fetch, FetchResponse, FetchSomeOptions,
    HttpMethod, HttpRequest, HttpResponse, TransportError, ValidationError,
};
use async_trait::async_trait;

const URL: &str = "http://some-url.com";

/// A response whose body can be made to fail on read.
struct ScriptedResponse {
    response: HttpResponse,
    body_error: Option<String>,
}

impl From<HttpResponse> for ScriptedResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            response,
            body_error: None,
        }
    }
}

#[async_trait]
impl FetchResponse for ScriptedResponse {
    fn status(&self) -> u16 {
        self.response.status
    }

    fn header(&self, name: &str) -> Option<String> {
        self.response.header(name).map(str::to_string)
    }

    async fn text(self) -> Result<String, TransportError> {
        match self.body_error {
            Some(message) => Err(TransportError::new(message)),
            None => Ok(self.response.body),
        }
    }
}

type Handler = dyn Fn(&HttpRequest) -> Result<ScriptedResponse, TransportError> + Send + Sync;

struct ScriptedFetch {
    handler: Box<Handler>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl fmt::Debug for ScriptedFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedFetch")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    type Response = ScriptedResponse;

    async fn fetch(&self, request: &HttpRequest) -> Result<ScriptedResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

/// Build a client whose transport answers every request with `handler`.
fn client_with<H>(handler: H) -> (ArgumentsClient<ScriptedFetch>, Arc<Mutex<Vec<HttpRequest>>>)
where
    H: Fn(&HttpRequest) -> Result<ScriptedResponse, TransportError> + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let fetch = ScriptedFetch {
        handler: Box::new(handler),
        calls: Arc::clone(&calls),
    };
    let client = ArgumentsClient::new(ClientConfig::new(URL, fetch)).unwrap();
    (client, calls)
}

/// Build a client whose transport always returns `response`.
fn client_returning(response: HttpResponse) -> (ArgumentsClient<ScriptedFetch>, Arc<Mutex<Vec<HttpRequest>>>) {
    client_with(move |_| Ok(response.clone().into()))
}

fn recorded(calls: &Arc<Mutex<Vec<HttpRequest>>>) -> Vec<HttpRequest> {
    calls.lock().unwrap().clone()
}

fn argument_json(id: i64, version: u32) -> String {
    format!(
        r#"{{"argument":{{"id":{id},"version":{version},"conclusion":"Socrates is mortal","premises":["Socrates is a man","All men are mortal"]}}}}"#
    )
}

fn socrates() -> Argument {
    Argument::new("Socrates is mortal", ["Socrates is a man", "All men are mortal"])
}

// --- get_one ---

#[tokio::test]
async fn get_one_not_found_resolves_to_none() {
    let (client, calls) = client_returning(HttpResponse::new(404, ""));

    assert_eq!(client.get_one(1, None).await.unwrap(), None);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Get);
    assert_eq!(calls[0].path, format!("{URL}/arguments/1"));
}

#[tokio::test]
async fn get_one_targets_specific_version() {
    let (client, calls) = client_returning(HttpResponse::new(404, ""));

    client.get_one(1, Some(2)).await.unwrap();

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, format!("{URL}/arguments/1/version/2"));
}

#[tokio::test]
async fn get_one_parses_the_argument() {
    let (client, _) = client_returning(HttpResponse::new(200, argument_json(1, 4)));

    let argument = client.get_one(1, None).await.unwrap().unwrap();
    assert_eq!(argument.id, 1);
    assert_eq!(argument.version, 4);
    assert_eq!(argument.conclusion, "Socrates is mortal");
}

#[tokio::test]
async fn get_one_server_error_names_status_and_body() {
    let (client, calls) = client_returning(HttpResponse::new(500, "something bad happened"));

    let err = client.get_one(1, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(err.to_string(), "The server responded with a 500: something bad happened");
    assert_eq!(recorded(&calls).len(), 1);
}

#[tokio::test]
async fn get_one_not_found_does_not_need_the_body() {
    let (client, _) = client_with(|_| {
        Ok(ScriptedResponse {
            response: HttpResponse::new(404, ""),
            body_error: Some("stream closed".to_string()),
        })
    });

    assert_eq!(client.get_one(3, None).await.unwrap(), None);
}

// --- get_some / get_all ---

#[tokio::test]
async fn get_some_server_error_rejects() {
    let (client, calls) = client_returning(HttpResponse::new(502, "bad gateway"));

    let err = client.get_some(&FetchSomeOptions::default()).await.unwrap_err();
    assert!(err.to_string().contains("502"));
    assert!(err.to_string().contains("bad gateway"));
    assert_eq!(recorded(&calls).len(), 1);
}

#[tokio::test]
async fn get_some_not_found_is_an_empty_list() {
    let (client, _) = client_returning(HttpResponse::new(404, ""));

    let some = client.get_some(&FetchSomeOptions::default()).await.unwrap();
    assert!(some.arguments.is_empty());
}

#[tokio::test]
async fn get_some_builds_the_query() {
    let (client, calls) = client_returning(HttpResponse::new(200, r#"{"arguments":[]}"#));

    let options = FetchSomeOptions {
        search: Some("mortal".to_string()),
        count: Some(2),
        exclude: vec![8, 9],
        ..Default::default()
    };
    client.get_some(&options).await.unwrap();

    assert_eq!(
        recorded(&calls)[0].path,
        format!("{URL}/arguments?search=mortal&count=2&exclude=8%2C9")
    );
}

#[tokio::test]
async fn get_all_filters_by_conclusion() {
    let (client, calls) = client_returning(HttpResponse::new(200, r#"{"arguments":[]}"#));

    client.get_all("Socrates is mortal").await.unwrap();

    assert_eq!(
        recorded(&calls)[0].path,
        format!("{URL}/arguments?conclusion=Socrates%20is%20mortal")
    );
}

#[tokio::test]
async fn get_all_with_empty_conclusion_never_fetches() {
    let (client, calls) = client_returning(HttpResponse::new(200, r#"{"arguments":[]}"#));

    let err = client.get_all("").await.unwrap_err();
    assert!(matches!(err, ApiError::Invalid(ValidationError::EmptyConclusionFilter)));
    assert!(recorded(&calls).is_empty());
}

// --- save ---

#[tokio::test]
async fn save_rejects_invalid_arguments_without_fetching() {
    let (client, calls) = client_returning(HttpResponse::new(201, argument_json(1, 1)));

    let no_conclusion = Argument::new("", ["a", "b"]);
    let one_premise = Argument::new("c", ["a"]);
    let duplicate = Argument::new("c", ["a", "b", "a"]);

    let err = client.save(&no_conclusion).await.unwrap_err();
    assert_eq!(err.to_string(), "An argument must have a conclusion.");
    let err = client.save(&one_premise).await.unwrap_err();
    assert_eq!(err.to_string(), "An argument must have at least two premises.");
    let err = client.save(&duplicate).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Arguments shouldn't use the same premise more than once. Yours repeats: a"
    );

    assert!(recorded(&calls).is_empty());
}

#[tokio::test]
async fn save_posts_the_argument_once() {
    let response = HttpResponse::new(201, argument_json(7, 1)).with_header("Location", "/arguments/7/version/1");
    let (client, calls) = client_returning(response);

    let saved = client.save(&socrates()).await.unwrap();
    assert_eq!(saved.location, "/arguments/7/version/1");
    assert_eq!(saved.argument.id, 7);
    assert_eq!(saved.argument.premises, socrates().premises);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Post);
    assert_eq!(calls[0].path, format!("{URL}/arguments"));
    let sent: Argument = serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, socrates());
}

#[tokio::test]
async fn save_server_error_rejects() {
    let (client, _) = client_returning(HttpResponse::new(503, "try later"));

    let err = client.save(&socrates()).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 503, .. }));
}

#[tokio::test]
async fn save_bad_request_is_an_http_error() {
    let (client, _) = client_returning(HttpResponse::new(400, "arguments must have a conclusion"));

    let err = client.save(&socrates()).await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 400, .. }));
}

// --- update ---

#[tokio::test]
async fn update_without_changes_never_fetches() {
    let (client, calls) = client_returning(HttpResponse::new(200, argument_json(1, 2)));

    let err = client.update(1, &ArgumentUpdate::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "Updates must change premises, a conclusion, or both.");
    assert!(recorded(&calls).is_empty());
}

#[tokio::test]
async fn update_with_invalid_premises_never_fetches() {
    let (client, calls) = client_returning(HttpResponse::new(200, argument_json(1, 2)));

    let err = client
        .update(1, &ArgumentUpdate::premises(["only one"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Invalid(ValidationError::TooFewPremises)));
    assert!(recorded(&calls).is_empty());
}

#[tokio::test]
async fn update_with_blank_conclusion_never_fetches() {
    let (client, calls) = client_returning(HttpResponse::new(200, argument_json(1, 2)));

    let update = ArgumentUpdate {
        conclusion: Some(String::new()),
        premises: Some(vec!["Socrates is a man".to_string(), "All men are mortal".to_string()]),
    };
    let err = client.update(1, &update).await.unwrap_err();
    assert!(matches!(err, ApiError::Invalid(ValidationError::MissingConclusion)));
    assert_eq!(err.to_string(), "An argument must have a conclusion.");
    assert!(recorded(&calls).is_empty());
}

#[tokio::test]
async fn update_patches_and_returns_the_new_version() {
    let response = HttpResponse::new(200, argument_json(1, 2)).with_header("location", "/arguments/1/version/2");
    let (client, calls) = client_returning(response);

    let updated = client
        .update(1, &ArgumentUpdate::conclusion("Socrates is mortal"))
        .await
        .unwrap();
    assert_eq!(updated.location, "/arguments/1/version/2");
    assert_eq!(updated.argument.version, 2);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Patch);
    assert_eq!(calls[0].path, format!("{URL}/arguments/1"));
    assert_eq!(calls[0].body.as_deref(), Some(r#"{"conclusion":"Socrates is mortal"}"#));
}

#[tokio::test]
async fn update_not_found_embeds_the_body() {
    let (client, _) = client_returning(HttpResponse::new(404, "argument 1 does not exist"));

    let err = client
        .update(1, &ArgumentUpdate::conclusion("new"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert!(err.to_string().contains("argument 1 does not exist"));
}

#[tokio::test]
async fn update_not_found_with_unreadable_body_is_reported() {
    let (client, _) = client_with(|_| {
        Ok(ScriptedResponse {
            response: HttpResponse::new(404, ""),
            body_error: Some("connection reset".to_string()),
        })
    });

    let err = client
        .update(1, &ArgumentUpdate::conclusion("new"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UnreadableBody { status: 404, .. }));
    assert_eq!(
        err.to_string(),
        "The server returned a 404, and an error occurred while reading the response body: connection reset."
    );
}

#[tokio::test]
async fn update_server_error_rejects() {
    let (client, calls) = client_returning(HttpResponse::new(502, "upstream down"));

    let err = client
        .update(1, &ArgumentUpdate::conclusion("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 502, .. }));
    assert_eq!(err.to_string(), "The server responded with a 502: upstream down");

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Patch);
}

// --- delete ---

#[tokio::test]
async fn delete_outcomes() {
    let (client, calls) = client_returning(HttpResponse::new(204, ""));
    client.delete(4).await.unwrap();
    let calls = recorded(&calls);
    assert_eq!(calls[0].method, HttpMethod::Delete);
    assert_eq!(calls[0].path, format!("{URL}/arguments/4"));

    let (client, _) = client_returning(HttpResponse::new(404, "argument 4 does not exist"));
    let err = client.delete(4).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

// --- transport ---

#[tokio::test]
async fn transport_failures_surface_as_transport_errors() {
    let (client, _) = client_with(|_| Err(TransportError::new("connection refused")));

    let err = client.get_one(1, None).await.unwrap_err();
    assert_eq!(err.to_string(), "transport failed: connection refused");
    match err {
        ApiError::Transport(e) => assert_eq!(e.message(), "connection refused"),
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn trailing_slash_is_trimmed_once() {
    let fetch = ScriptedFetch {
        handler: Box::new(|_: &HttpRequest| -> Result<ScriptedResponse, TransportError> {
            Ok(HttpResponse::new(404, "").into())
        }),
        calls: Arc::default(),
    };
    let calls = Arc::clone(&fetch.calls);
    let client = ArgumentsClient::new(ClientConfig::new(format!("{URL}/"), fetch)).unwrap();
    assert_eq!(client.codec().base_url(), URL);

    client.get_one(5, None).await.unwrap();
    assert_eq!(recorded(&calls)[0].path, format!("{URL}/arguments/5"));
}

#[tokio::test]
async fn invalid_base_url_is_rejected_at_construction() {
    let fetch = ScriptedFetch {
        handler: Box::new(|_: &HttpRequest| -> Result<ScriptedResponse, TransportError> {
            Ok(HttpResponse::new(200, "").into())
        }),
        calls: Arc::default(),
    };
    let err = ArgumentsClient::new(ClientConfig::new("not a url", fetch)).unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl { .. }));
}

// --- concurrency ---

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    let (client, calls) = client_with(|request| {
        let id = if request.path.ends_with("/1") { 1 } else { 2 };
        Ok(HttpResponse::new(200, argument_json(id, id as u32)).into())
    });
    let client = Arc::new(client);

    let first = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.get_one(1, None).await })
    };
    let second = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.get_one(2, None).await })
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap().unwrap().unwrap().id, 1);
    assert_eq!(second.unwrap().unwrap().unwrap().id, 2);
    assert_eq!(recorded(&calls).len(), 2);
}
