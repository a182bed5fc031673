use std::fmt;
use std::sync::Arc;

use crate::request::RequestDescriptor;
use crate::response::HttpResponse;

/// Hook run on the built request before admission.
pub type PreRequestHook = Arc<dyn Fn(&mut RequestDescriptor) + Send + Sync>;

/// Hook run on a response that passed transport classification.
pub type PostResponseHook = Arc<dyn Fn(&RequestDescriptor, &mut HttpResponse) + Send + Sync>;

/// Optional request and response interception points. Both default to no-op.
///
/// Hooks may mutate what they are given but cannot change which pipeline
/// stage runs next.
#[derive(Clone, Default)]
pub struct Interceptors {
    pre_request: Option<PreRequestHook>,
    post_response: Option<PostResponseHook>,
}

impl Interceptors {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pre-request hook.
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestDescriptor) + Send + Sync + 'static,
    {
        self.pre_request = Some(Arc::new(hook));
        self
    }

    /// Sets the post-response hook.
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestDescriptor, &mut HttpResponse) + Send + Sync + 'static,
    {
        self.post_response = Some(Arc::new(hook));
        self
    }

    pub(crate) fn pre_request(&self, request: &mut RequestDescriptor) {
        if let Some(hook) = &self.pre_request {
            hook(request);
        }
    }

    pub(crate) fn post_response(&self, request: &RequestDescriptor, response: &mut HttpResponse) {
        if let Some(hook) = &self.post_response {
            hook(request, response);
        }
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("pre_request", &self.pre_request.is_some())
            .field("post_response", &self.post_response.is_some())
            .finish()
    }
}
