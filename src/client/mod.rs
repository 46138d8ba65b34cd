/// Boundary with the remote content-feed service.
///
/// The crate does no network I/O. [`BaseClient`](base_client::BaseClient) turns items
/// into [`FeedRequest`]s, hands them to a caller supplied [`Transport`], and interprets the
/// [`FeedResponse`]: it records the identifier assigned on creation and classifies
/// failures into [`FeedError::ItemNotFound`](crate::error::FeedError::ItemNotFound) or
/// [`FeedError::ErrorResponse`](crate::error::FeedError::ErrorResponse).
///
/// # Examples
///
/// ```
/// use base_feed::client::{BaseClientBuilder, FeedRequest, FeedResponse, Transport};
/// use base_feed::error::FeedResult;
/// use base_feed::item::{UniversalAttributes, UniversalItem};
///
/// struct Accepting;
///
/// impl Transport for Accepting {
///     fn send(&self, _request: &FeedRequest) -> FeedResult<FeedResponse> {
///         Ok(FeedResponse::new(201, "")
///             .header("Location", "http://base.google.com/base/feeds/items/1234"))
///     }
/// }
///
/// let client = BaseClientBuilder::new()
///     .api_key("key")
///     .auth_token("token")
///     .transport(Accepting)
///     .build()
///     .unwrap();
///
/// let mut item = UniversalItem::new().unwrap();
/// item.set_title("Chair");
/// let base_id = client.create_item(item.item_mut()).unwrap();
/// assert_eq!(base_id, "1234");
/// assert_eq!(item.item().base_id.as_deref(), Some("1234"));
/// ```
pub mod base_client;

use std::fmt;

use crate::core::item::Item;
use crate::error::FeedResult;

pub use base_client::{BaseClient, BaseClientBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready to be sent by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FeedRequest {
    /// Header value, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The remote answer as reported by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl FeedResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    /// Adds a header; builder style.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Header value, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends requests to the remote service. Implemented by the caller's HTTP stack.
pub trait Transport {
    fn send(&self, request: &FeedRequest) -> FeedResult<FeedResponse>;
}

/// Anything that can name a remote item: an [`Item`] or its raw identifier.
pub trait ItemReference {
    fn base_id(&self) -> Option<&str>;
}

impl ItemReference for Item {
    fn base_id(&self) -> Option<&str> {
        self.base_id.as_deref()
    }
}

impl ItemReference for str {
    fn base_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl ItemReference for String {
    fn base_id(&self) -> Option<&str> {
        Some(self.as_str())
    }
}
