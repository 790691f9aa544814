//! Community service client.
//!
//! The client only does one thing with state: change-stream listeners. It is
//! bound to a validated [`ClientConfig`] and one shared [`HttpClient`], so
//! every listener it creates reuses the same connection pool.

use std::sync::Arc;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::listener::{
    subscriber, ChangeStreamListener, Dispatcher, ListenerConfig, Notification, Subscriber,
};
use crate::traits::{Headers, HttpClient};

/// Resource backing [`CommunityClient::listen_for_new_posts`].
pub const POSTS: &str = "Posts";
/// Resource backing [`CommunityClient::listen_for_new_quarantines`].
pub const QUARANTINES: &str = "Quarantines";
/// Resource backing [`CommunityClient::listen_for_new_comments`].
pub const COMMENTS: &str = "Comments";

/// Client for the community service change streams.
///
/// # Example
///
/// ```ignore
/// use community_client::{subscriber, ClientConfig, CommunityClient};
///
/// let client = CommunityClient::new(ClientConfig::new("http://localhost:3000/"))?;
/// let listener = client.listen_for_new_posts(vec![subscriber(|n| println!("{:?}", n))])?;
/// listener.ready().await?;
/// ```
#[derive(Clone)]
pub struct CommunityClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl CommunityClient {
    /// Create a client using the pooled reqwest adapter.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let http = ReqwestHttpClient::with_user_agent(config.user_agent.as_deref());
        Self::with_http_client(config, Arc::new(http))
    }

    /// Create a client with a custom HTTP implementation.
    pub fn with_http_client(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start listening on `resource`.
    ///
    /// Fails before any request is made if the resource name is unusable or
    /// `subscribers` is empty. Otherwise the listener runs until shut down,
    /// delivering every event and error to each subscriber in order.
    /// Must be called from within a tokio runtime.
    pub fn listen(
        &self,
        resource: &str,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Result<ChangeStreamListener, ConfigError> {
        let url = self.config.change_stream_url(resource)?;
        let dispatcher = Dispatcher::new(subscribers)?;

        Ok(ChangeStreamListener::spawn(
            self.http.clone(),
            dispatcher,
            ListenerConfig {
                url,
                resource: resource.to_string(),
                headers: Headers::new(),
                policy: self.config.reconnect,
            },
        ))
    }

    /// Start listening on `resource` with a single subscriber.
    pub fn listen_with<F>(&self, resource: &str, f: F) -> Result<ChangeStreamListener, ConfigError>
    where
        F: Fn(Notification<'_>) + Send + Sync + 'static,
    {
        self.listen(resource, vec![subscriber(f)])
    }

    /// Listen for changes to posts.
    pub fn listen_for_new_posts(
        &self,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Result<ChangeStreamListener, ConfigError> {
        self.listen(POSTS, subscribers)
    }

    /// Listen for changes to quarantines.
    pub fn listen_for_new_quarantines(
        &self,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Result<ChangeStreamListener, ConfigError> {
        self.listen(QUARANTINES, subscribers)
    }

    /// Listen for changes to comments.
    pub fn listen_for_new_comments(
        &self,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Result<ChangeStreamListener, ConfigError> {
        self.listen(COMMENTS, subscribers)
    }
}

impl std::fmt::Debug for CommunityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunityClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
