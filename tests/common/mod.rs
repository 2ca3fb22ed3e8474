#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::Notify;

use earn_core::embed::{EmbedHost, Frame, MountId};
use earn_core::yaas::{HttpRequest, HttpResponse, HttpTransport, TransportFailure};

/// In-memory transport answering by URL suffix and recording every request.
#[derive(Default)]
pub struct RecordingTransport {
    routes: Mutex<Vec<(String, Result<HttpResponse, TransportFailure>)>>,
    requests: Mutex<Vec<HttpRequest>>,
    hold: Mutex<bool>,
    release: Notify,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, suffix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.lock().unwrap().push((
            suffix.to_string(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        ));
        self
    }

    pub fn fail(self, suffix: &str, failure: TransportFailure) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((suffix.to_string(), Err(failure)));
        self
    }

    /// Parks every request after recording it until `release` is called.
    pub fn held(self) -> Self {
        *self.hold.lock().unwrap() = true;
        self
    }

    pub fn release(&self) {
        *self.hold.lock().unwrap() = false;
        self.release.notify_waiters();
        self.release.notify_one();
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let held = *self.hold.lock().unwrap();
        if held {
            self.release.notified().await;
        }

        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or(Ok(HttpResponse {
                status: 404,
                body: "not found".to_string(),
            }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    InjectStyle(String),
    CreateMount(String),
    Render(MountId, Frame),
    Dispatch(String, serde_json::Value),
    Navigate(String),
}

/// In-memory page: a set of element ids plus a log of what the widget did to it.
#[derive(Default)]
pub struct RecordingHost {
    elements: Mutex<Vec<String>>,
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: &str) -> Self {
        self.elements.lock().unwrap().push(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Render(_, frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    pub fn style_injections(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, HostCall::InjectStyle(_)))
            .count()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl EmbedHost for RecordingHost {
    fn has_element(&self, id: &str) -> bool {
        self.elements.lock().unwrap().iter().any(|e| e == id)
    }

    fn inject_style(&self, id: &str, _css: &str) {
        self.elements.lock().unwrap().push(id.to_string());
        self.record(HostCall::InjectStyle(id.to_string()));
    }

    fn find_container(&self, id: &str) -> Option<MountId> {
        self.has_element(id).then(|| MountId(id.to_string()))
    }

    fn create_mount_before_script(&self, class_name: &str) -> MountId {
        let mut elements = self.elements.lock().unwrap();
        let id = format!("{}-{}", class_name, elements.len());
        elements.push(id.clone());
        drop(elements);
        self.record(HostCall::CreateMount(class_name.to_string()));
        MountId(id)
    }

    fn render(&self, mount: &MountId, frame: &Frame) {
        self.record(HostCall::Render(mount.clone(), frame.clone()));
    }

    fn dispatch_event(&self, name: &str, detail: serde_json::Value) {
        self.record(HostCall::Dispatch(name.to_string(), detail));
    }

    fn navigate(&self, url: &str) {
        self.record(HostCall::Navigate(url.to_string()));
    }
}
