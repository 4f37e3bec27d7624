use async_trait::async_trait;
use brandchat_core::{ChatError, ChatRequest, ChatService};
use futures::future::{select, Either};
use futures::pin_mut;
use gloo_timers::future::TimeoutFuture;

/// Gives up on the wrapped service after a fixed time.
///
/// The underlying `fetch` is not aborted; its result is simply never read.
pub struct TimeoutService<S> {
    inner: S,
    timeout_ms: Option<u32>,
}

impl<S> TimeoutService<S> {
    pub fn new(inner: S, timeout_ms: Option<u32>) -> Self {
        Self { inner, timeout_ms }
    }
}

#[async_trait(?Send)]
impl<S: ChatService> ChatService for TimeoutService<S> {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let Some(after_ms) = self.timeout_ms else {
            return self.inner.send(request).await;
        };

        let call = self.inner.send(request);
        let timer = TimeoutFuture::new(after_ms);
        pin_mut!(call, timer);

        match select(call, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(ChatError::Timeout { after_ms }),
        }
    }
}
