//! Mock version of the feed transport
use mockall::mock;

use base_feed::client::{FeedRequest, FeedResponse, Transport};
use base_feed::error::FeedResult;

mock! {
    pub Transport {}
    impl Transport for Transport {
        fn send(&self, request: &FeedRequest) -> FeedResult<FeedResponse>;
    }
}
