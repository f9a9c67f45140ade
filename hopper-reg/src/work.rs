//  WORK.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 11:47:33
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the `/workqueue/...` paths: the available-work endpoint
//!   that streams eligible elements back to the caller, and the element
//!   count.
//!
//!   Callers of the available-work endpoint distinguish outcomes by the
//!   shape of the returned JSON value: an array on success, the empty
//!   object when no resources were requested, and a string when a
//!   parameter did not parse. There is no separate status code; the
//!   payload is the error channel.
//

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;

use serde_json::Value;
use specifications::workqueue::SiteResources;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;
use warp::Filter as _;
use warp::filters::BoxedFilter;
use warp::http::Response;
use warp::http::header::{CONTENT_TYPE, HeaderValue};
use warp::hyper::Body;
use warp::reject::Rejection;

use crate::restrict::{Filters, Sink, restrict_work};
use crate::spec::Context;


/***** HELPER FUNCTIONS *****/
/// Wraps the given body in an `application/json` response.
fn json_response(body: Body) -> Response<Body> {
    let mut res: Response<Body> = Response::new(body);
    res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res
}

/// Renders the reply for a parameter that did not parse: one JSON string carrying the parameter
/// name and its raw text.
fn parse_error_payload(param: &str, raw: &str) -> String { Value::String(format!("Error parsing {param}: {raw}")).to_string() }

/// Parses a `teams`/`wfs` query parameter as a JSON array of names.
fn parse_names(raw: &str) -> Result<HashSet<String>, serde_json::Error> {
    serde_json::from_str::<Vec<String>>(raw).map(|names| names.into_iter().collect())
}



/// [`Sink`] that forwards fragments into the response body channel.
struct BodySink(UnboundedSender<Vec<u8>>);
impl Sink for BodySink {
    #[inline]
    fn send(&mut self, chunk: &[u8]) -> bool { self.0.send(chunk.to_vec()).is_ok() }
}





/***** HANDLERS *****/
/// Handler for `GET /workqueue/work`.
///
/// Consumes three query parameters: `resources` (required; JSON object whose keys are the sites
/// with free slots), `teams` and `wfs` (both optional; JSON arrays of names). Streams back the
/// matching documents as one JSON array, in row order, as they are found.
///
/// # Arguments
/// - `query`: The raw query parameters of this request.
/// - `context`: The [`Context`] holding the element store.
///
/// # Returns
/// A 200 response whose chunked body is the JSON array (or the `{}` / string special shapes, see
/// the module docs).
///
/// # Errors
/// This function never rejects; parameter trouble is reported through the payload itself.
pub async fn available(query: HashMap<String, String>, context: Arc<Context>) -> Result<Response<Body>, Rejection> {
    debug!("Handling GET on `/workqueue/work` (available work)");

    // No resources requested means nothing to hand out, which is not an error
    let raw: &String = match query.get("resources") {
        Some(raw) => raw,
        None => {
            debug!("No resources given; replying with the empty object");
            return Ok(json_response(Body::from("{}")));
        },
    };
    let resources: SiteResources = match raw.parse() {
        Ok(resources) => resources,
        Err(err) => {
            debug!("Given resources {raw:?} did not parse: {err}");
            return Ok(json_response(Body::from(parse_error_payload("resources", raw))));
        },
    };

    // The team- and workflow restrictions are optional
    let mut filters: Filters = Filters::default();
    if let Some(raw) = query.get("teams") {
        match parse_names(raw) {
            Ok(teams) => filters.teams = teams,
            Err(err) => {
                debug!("Given teams {raw:?} did not parse: {err}");
                return Ok(json_response(Body::from(parse_error_payload("teams", raw))));
            },
        }
    }
    if let Some(raw) = query.get("wfs") {
        match parse_names(raw) {
            Ok(workflows) => filters.workflows = workflows,
            Err(err) => {
                debug!("Given wfs {raw:?} did not parse: {err}");
                return Ok(json_response(Body::from(parse_error_payload("wfs", raw))));
            },
        }
    }

    // Run the pass on a blocking thread, bridging its fragments into the response body so the
    // caller sees output as soon as it exists
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        let mut sink: BodySink = BodySink(tx);
        restrict_work(context.store.rows(), &resources, &filters, &mut sink);
    });
    Ok(json_response(Body::wrap_stream(UnboundedReceiverStream::new(rx).map(Ok::<Vec<u8>, Infallible>))))
}



/// Handler for `GET /workqueue/count`.
///
/// # Arguments
/// - `context`: The [`Context`] holding the element store.
///
/// # Returns
/// A 200 response whose body is the number of live elements in the snapshot, as a JSON number.
pub async fn count(context: Arc<Context>) -> Result<Response<Body>, Rejection> {
    debug!("Handling GET on `/workqueue/count`");
    Ok(json_response(Body::from(context.store.count().to_string())))
}





/***** LIBRARY *****/
/// Returns the warp filter for the `/workqueue/...` paths.
///
/// # Arguments
/// - `context`: The [`Context`] to hand to every handler.
pub fn routes(context: Arc<Context>) -> BoxedFilter<(Response<Body>,)> {
    let context = warp::any().map(move || context.clone());
    let work = warp::get()
        .and(warp::path("workqueue"))
        .and(warp::path("work"))
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(context.clone())
        .and_then(available);
    let count = warp::get()
        .and(warp::path("workqueue"))
        .and(warp::path("count"))
        .and(warp::path::end())
        .and(context)
        .and_then(count);
    work.or(count).unify().boxed()
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::store::ElementStore;


    /// Percent-encodes a query parameter value.
    fn enc(raw: &str) -> String {
        let mut out: String = String::new();
        for b in raw.bytes() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{b:02X}"));
            }
        }
        out
    }

    /// Builds a context around a two-element snapshot plus one tombstone.
    fn context() -> Arc<Context> {
        let mut file: NamedTempFile = NamedTempFile::new().unwrap();
        write!(file, "{}", json!([
            { "_id": "ele-a", "_rev": "1-a", "element": { "RequestName": "wf1", "TeamName": "production", "Priority": 100 } },
            { "_id": "ele-b", "_rev": "1-b", "element": { "RequestName": "wf2", "SiteWhitelist": ["T2_XX_SiteB"], "Priority": 50 } },
            { "_id": "ele-c", "_rev": "2-c", "_deleted": true },
        ]))
        .unwrap();
        Arc::new(Context { store: ElementStore::from_path(file.path()).unwrap() })
    }


    #[tokio::test]
    async fn test_missing_resources_yields_empty_object() {
        let routes = routes(context());
        let res = warp::test::request().method("GET").path("/workqueue/work").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body(), "{}");
    }

    #[tokio::test]
    async fn test_malformed_resources_yields_error_string() {
        let routes = routes(context());
        let res = warp::test::request().method("GET").path(&format!("/workqueue/work?resources={}", enc("{bad"))).reply(&routes).await;
        assert_eq!(res.status(), 200);

        // The reply is one JSON string echoing the raw parameter
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        let msg: &str = body.as_str().unwrap();
        assert!(msg.contains("resources"));
        assert!(msg.contains("{bad"));
    }

    #[tokio::test]
    async fn test_malformed_teams_and_wfs_yield_error_strings() {
        let routes = routes(context());
        for (param, raw) in [("teams", "[\"unterminated"), ("wfs", "{\"not\": \"an array\"}")] {
            let res = warp::test::request()
                .method("GET")
                .path(&format!("/workqueue/work?resources={}&{param}={}", enc("{\"T2_XX_SiteA\":1}"), enc(raw)))
                .reply(&routes)
                .await;
            assert_eq!(res.status(), 200);
            let body: Value = serde_json::from_slice(res.body()).unwrap();
            let msg: &str = body.as_str().unwrap();
            assert!(msg.contains(param));
            assert!(msg.contains(raw));
        }
    }

    #[tokio::test]
    async fn test_empty_resources_yields_empty_array() {
        let routes = routes(context());
        let res = warp::test::request().method("GET").path(&format!("/workqueue/work?resources={}", enc("{}"))).reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body(), "[]");
    }

    #[tokio::test]
    async fn test_available_work_streams_matches() {
        let routes = routes(context());

        // Site A satisfies only the unconstrained element
        let res = warp::test::request().method("GET").path(&format!("/workqueue/work?resources={}", enc("{\"T2_XX_SiteA\":4}"))).reply(&routes).await;
        assert_eq!(res.status(), 200);
        let docs: Vec<Value> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["_id"], "ele-a");
        assert_eq!(docs[0]["_rev"], "1-a");
        assert_eq!(docs[0]["element"]["RequestName"], "wf1");

        // Site B satisfies both
        let res = warp::test::request().method("GET").path(&format!("/workqueue/work?resources={}", enc("{\"T2_XX_SiteB\":4}"))).reply(&routes).await;
        let docs: Vec<Value> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_available_work_applies_team_filter() {
        let routes = routes(context());
        let res = warp::test::request()
            .method("GET")
            .path(&format!("/workqueue/work?resources={}&teams={}", enc("{\"T2_XX_SiteA\":4}"), enc("[\"reproc\"]")))
            .reply(&routes)
            .await;
        assert_eq!(res.body(), "[]");
    }

    #[tokio::test]
    async fn test_available_work_applies_workflow_filter() {
        let routes = routes(context());
        let res = warp::test::request()
            .method("GET")
            .path(&format!("/workqueue/work?resources={}&wfs={}", enc("{\"T2_XX_SiteB\":4}"), enc("[\"wf2\"]")))
            .reply(&routes)
            .await;
        let docs: Vec<Value> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["_id"], "ele-b");
    }

    #[tokio::test]
    async fn test_count_ignores_tombstones() {
        let routes = routes(context());
        let res = warp::test::request().method("GET").path("/workqueue/count").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body(), "2");
    }
}
