use log::{debug, warn};

use crate::core::item::Item;
use crate::error::{FeedError, FeedResult};
use crate::xml::XmlDocument;

use super::{FeedRequest, FeedResponse, HttpMethod, ItemReference, Transport};

pub const BASE_HOST: &str = "base.google.com";
pub const ITEMS_PATH: &str = "/base/feeds/items/";
pub const SNIPPETS_PATH: &str = "/base/feeds/snippets/";
pub const ITEM_URL: &str = "http://www.google.com/base/feeds/items/";
pub const CONTENT_TYPE: &str = "application/atom+xml";

/// Marker the service puts in the body of a 404 for an unknown item.
const NOT_FOUND_MARKER: &str = "Cannot find item";

/// Creates, updates, deletes and fetches items through a [`Transport`].
pub struct BaseClient<T: Transport> {
    transport: T,
    api_key: String,
    auth_token: String,
    host: String,
    feed_path: &'static str,
    dry_run: bool,
}

impl<T: Transport> BaseClient<T> {
    /// Posts `item` as a new entry and stores the identifier assigned by the service in
    /// `item.base_id`.
    ///
    /// # Errors
    ///
    /// - [`FeedError::ErrorResponse`] for any non-2xx answer.
    /// - [`FeedError::InvalidResponse`] if the `Location` header carries no numeric id.
    pub fn create_item(&self, item: &mut Item) -> FeedResult<String> {
        let body = item.to_document().to_xml_string()?;
        let request = self.request(HttpMethod::Post, self.feed_url(None), Some(body));
        let response = self.send(&request)?;

        if !response.is_success() {
            warn!("Error creating base item: status {}", response.status);
            return Err(FeedError::ErrorResponse {
                message: format!("Error creating base item: {}", response.body),
                response,
            });
        }

        let base_id = response
            .header_value("location")
            .and_then(extract_base_id)
            .ok_or_else(|| {
                FeedError::InvalidResponse(
                    "Location header does not end with an item id".to_string(),
                )
            })?;
        debug!("Created base item {}", base_id);

        item.base_id = Some(base_id.clone());
        Ok(base_id)
    }

    /// Replaces the remote entry of `item` with its current content.
    ///
    /// # Errors
    ///
    /// [`FeedError::MissingRequiredField`] when `item.base_id` is unset; otherwise the
    /// classified remote failure.
    pub fn update_item(&self, item: &Item) -> FeedResult<()> {
        let base_id = required_base_id(item)?;
        let body = item.to_document().to_xml_string()?;
        let request = self.request(HttpMethod::Put, self.feed_url(Some(base_id)), Some(body));
        let response = self.send(&request)?;
        classify("Error updating base item", response)
    }

    /// Deletes the remote entry named by `item` (an [`Item`] or a raw identifier).
    pub fn delete_item<R: ItemReference + ?Sized>(&self, item: &R) -> FeedResult<()> {
        let base_id = required_base_id(item)?;
        let request = self.request(HttpMethod::Delete, self.feed_url(Some(base_id)), None);
        let response = self.send(&request)?;
        classify("Error deleting base item", response)
    }

    /// Fetches a stored entry and parses it.
    pub fn get_item(&self, base_id: &str) -> FeedResult<XmlDocument> {
        let mut url = format!("{}{}", ITEM_URL, base_id);
        if self.dry_run {
            url.push_str("?dry-run=true");
        }
        let request = self.request(HttpMethod::Get, url, None);
        let response = self.send(&request)?;
        let body = response.body.clone();
        classify("Error fetching base item", response)?;
        XmlDocument::parse(&body)
    }

    /// Feed URL, with the item id appended when given and the dry-run flag when enabled.
    pub fn feed_url(&self, base_id: Option<&str>) -> String {
        let mut url = format!("http://{}{}", self.host, self.feed_path);
        if let Some(base_id) = base_id {
            url.push_str(base_id);
        }
        if self.dry_run {
            url.push_str("?dry-run=true");
        }
        url
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> FeedRequest {
        FeedRequest {
            method,
            url,
            headers: vec![
                ("X-Google-Key".to_string(), format!("key={}", self.api_key)),
                (
                    "Authorization".to_string(),
                    format!("GoogleLogin auth={}", self.auth_token),
                ),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ],
            body,
        }
    }

    fn send(&self, request: &FeedRequest) -> FeedResult<FeedResponse> {
        debug!("-------{} {}----------", request.method, request.url);
        for (key, value) in &request.headers {
            if key.eq_ignore_ascii_case("authorization") {
                debug!("{}: <redacted>", key);
            } else {
                debug!("{}: {}", key, value);
            }
        }
        if let Some(body) = &request.body {
            debug!("{}", body);
        }

        let response = self.transport.send(request)?;

        debug!("-------response {}----------", response.status);
        for (key, value) in &response.headers {
            debug!("{}: {}", key, value);
        }
        debug!("{}", response.body);

        Ok(response)
    }
}

fn required_base_id<R: ItemReference + ?Sized>(item: &R) -> FeedResult<&str> {
    item.base_id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FeedError::MissingRequiredField("base_id".to_string()))
}

/// Maps a remote answer to `Ok` (200) or the matching error kind.
fn classify(message: &str, response: FeedResponse) -> FeedResult<()> {
    if response.is_not_found() && response.body.contains(NOT_FOUND_MARKER) {
        warn!("{}: item not found", message);
        return Err(FeedError::ItemNotFound {
            message: format!("{}: {}", message, response.body),
            response,
        });
    }
    if !response.is_ok() {
        warn!("{}: status {}", message, response.status);
        return Err(FeedError::ErrorResponse {
            message: format!("{}: {}", message, response.body),
            response,
        });
    }
    Ok(())
}

/// Trailing run of digits of a `Location` header.
fn extract_base_id(location: &str) -> Option<String> {
    let location = location.trim_end();
    let digits = location.len() - location.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    Some(location[location.len() - digits..].to_string())
}

/// Builder for [`BaseClient`].
///
/// The API key, the authentication token and the transport are required. Requests go to
/// the public snippets feed unless `public_feed(false)` selects the private items feed.
pub struct BaseClientBuilder<T: Transport> {
    transport: Option<T>,
    api_key: Option<String>,
    auth_token: Option<String>,
    host: String,
    public_feed: bool,
    dry_run: bool,
}

impl<T: Transport> Default for BaseClientBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> BaseClientBuilder<T> {
    pub fn new() -> Self {
        Self {
            transport: None,
            api_key: None,
            auth_token: None,
            host: BASE_HOST.to_string(),
            public_feed: true,
            dry_run: false,
        }
    }

    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Token obtained from the service's login flow.
    pub fn auth_token(mut self, auth_token: &str) -> Self {
        self.auth_token = Some(auth_token.to_string());
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn public_feed(mut self, public_feed: bool) -> Self {
        self.public_feed = public_feed;
        self
    }

    /// Ask the service to validate requests without storing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> FeedResult<BaseClient<T>> {
        let missing = |field: &str| FeedError::MissingRequiredField(field.to_string());
        Ok(BaseClient {
            transport: self.transport.ok_or_else(|| missing("transport"))?,
            api_key: self.api_key.ok_or_else(|| missing("api_key"))?,
            auth_token: self.auth_token.ok_or_else(|| missing("auth_token"))?,
            host: self.host,
            feed_path: if self.public_feed {
                SNIPPETS_PATH
            } else {
                ITEMS_PATH
            },
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder {
        requests: RefCell<Vec<FeedRequest>>,
        response: FeedResponse,
    }

    impl Transport for Recorder {
        fn send(&self, request: &FeedRequest) -> FeedResult<FeedResponse> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn client(response: FeedResponse) -> BaseClient<Recorder> {
        BaseClientBuilder::new()
            .api_key("k")
            .auth_token("t")
            .public_feed(false)
            .transport(Recorder {
                requests: RefCell::new(Vec::new()),
                response,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_extract_base_id() {
        assert_eq!(
            extract_base_id("http://base.google.com/base/feeds/items/1234567"),
            Some("1234567".to_string())
        );
        assert_eq!(extract_base_id("http://x/items/12 "), Some("12".to_string()));
        assert_eq!(extract_base_id("http://x/items/abc"), None);
        assert_eq!(extract_base_id(""), None);
    }

    #[test]
    fn test_builder_requires_fields() {
        let result = BaseClientBuilder::<Recorder>::new().api_key("k").auth_token("t").build();
        assert!(matches!(result, Err(FeedError::MissingRequiredField(field)) if field == "transport"));
    }

    #[test]
    fn test_feed_urls() {
        let mut client = client(FeedResponse::new(200, ""));
        assert_eq!(client.feed_url(None), "http://base.google.com/base/feeds/items/");

        client.set_dry_run(true);
        assert!(client.is_dry_run());
        assert_eq!(
            client.feed_url(Some("9")),
            "http://base.google.com/base/feeds/items/9?dry-run=true"
        );
    }

    #[test]
    fn test_delete_by_raw_id() {
        let client = client(FeedResponse::new(200, ""));
        client.delete_item("55").unwrap();

        let requests = client.transport().requests.borrow();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].url, "http://base.google.com/base/feeds/items/55");
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[0].header("x-google-key"), Some("key=k"));
        assert_eq!(requests[0].header("authorization"), Some("GoogleLogin auth=t"));
    }

    #[test]
    fn test_delete_requires_id_before_sending() {
        let client = client(FeedResponse::new(200, ""));
        let result = client.delete_item("");

        assert!(matches!(result, Err(FeedError::MissingRequiredField(_))));
        assert!(client.transport().requests.borrow().is_empty());
    }

    #[test]
    fn test_classify() {
        assert!(classify("x", FeedResponse::new(200, "")).is_ok());

        let not_found = classify("x", FeedResponse::new(404, "Cannot find item 5"));
        assert!(matches!(not_found, Err(FeedError::ItemNotFound { .. })));

        let other_404 = classify("x", FeedResponse::new(404, "No such feed"));
        assert!(matches!(other_404, Err(FeedError::ErrorResponse { .. })));

        let created = classify("x", FeedResponse::new(201, ""));
        match created {
            Err(error) => assert_eq!(error.response().map(|r| r.status), Some(201)),
            Ok(()) => panic!("Expected ErrorResponse for a non-200 status"),
        }
    }

    #[test]
    fn test_get_item_parses_body() {
        let body = "<entry><title>Chair</title></entry>";
        let client = client(FeedResponse::new(200, body));

        let document = client.get_item("77").unwrap();
        assert_eq!(document.root().child("title").unwrap().text(), Some("Chair"));

        let requests = client.transport().requests.borrow();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "http://www.google.com/base/feeds/items/77");
    }
}
