//! Per-request context handed to route handlers.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

/// Response cookie. Rendered into a `Set-Cookie` header when the response is
/// finalized.
#[derive(Clone, Debug, Default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub max_age_secs: Option<i64>,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self { name: name.to_string(), value: value.to_string(), ..Self::default() }
    }

    pub(crate) fn header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(max_age) = self.max_age_secs {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

/// Mutable response settings a handler may adjust before returning. Applied to
/// the outgoing response when the handler did not reply explicitly, and the
/// headers/cookies are applied in every case.
#[derive(Clone, Debug)]
pub struct ResponseSet {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
}

impl Default for ResponseSet {
    fn default() -> Self {
        Self { status: 200, headers: Vec::new(), cookies: Vec::new() }
    }
}

/// An explicit reply recorded through [`Context::response`].
#[derive(Clone, Debug)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: Value,
}

/// Request-scoped context. Constructed fresh for every inbound request and
/// dropped when the response is written; never shared across requests.
///
/// The request mirrors (`body`, `params`, `query`, `headers`) are read-only.
/// Header keys are lowercased.
pub struct Context {
    pub body: Value,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    set: Mutex<ResponseSet>,
    reply: Mutex<Option<Reply>>,
}

impl Context {
    pub fn new(
        body: Value,
        params: HashMap<String, String>,
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            body,
            params,
            query,
            headers,
            set: Mutex::new(ResponseSet::default()),
            reply: Mutex::new(None),
        }
    }

    /// Record an explicit reply with the given status and body. The first call
    /// wins; later calls and any value the handler returns are ignored.
    pub fn response(&self, status: u16, data: Value) {
        let mut reply = self.reply.lock().unwrap_or_else(|e| e.into_inner());
        if reply.is_none() {
            *reply = Some(Reply { status, body: data });
        }
    }

    /// Status applied when the handler returns a value instead of calling
    /// [`Context::response`]. Defaults to 200.
    pub fn set_status(&self, status: u16) {
        self.set.lock().unwrap_or_else(|e| e.into_inner()).status = status;
    }

    /// Add a response header.
    pub fn set_header(&self, name: &str, value: &str) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .headers
            .push((name.to_string(), value.to_string()));
    }

    /// Add a response cookie.
    pub fn set_cookie(&self, cookie: Cookie) {
        self.set.lock().unwrap_or_else(|e| e.into_inner()).cookies.push(cookie);
    }

    /// Request header lookup by lowercased name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Consume the mutable response state for finalization.
    pub(crate) fn take_parts(&self) -> (Option<Reply>, ResponseSet) {
        let reply = self.reply.lock().unwrap_or_else(|e| e.into_inner()).take();
        let set =
            std::mem::take(&mut *self.set.lock().unwrap_or_else(|e| e.into_inner()));
        (reply, set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_ctx() -> Context {
        Context::new(Value::Null, HashMap::new(), HashMap::new(), HashMap::new())
    }

    #[test]
    fn first_response_call_wins() {
        let ctx = empty_ctx();
        ctx.response(404, json!({}));
        ctx.response(200, json!({"late": true}));
        let (reply, _) = ctx.take_parts();
        let reply = reply.expect("reply recorded");
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body, json!({}));
    }

    #[test]
    fn set_defaults_to_200_with_no_headers() {
        let ctx = empty_ctx();
        let (reply, set) = ctx.take_parts();
        assert!(reply.is_none());
        assert_eq!(set.status, 200);
        assert!(set.headers.is_empty());
        assert!(set.cookies.is_empty());
    }

    #[test]
    fn set_bag_accumulates() {
        let ctx = empty_ctx();
        ctx.set_status(201);
        ctx.set_header("x-total-count", "3");
        ctx.set_cookie(Cookie::new("session", "abc"));
        let (_, set) = ctx.take_parts();
        assert_eq!(set.status, 201);
        assert_eq!(set.headers, vec![("x-total-count".to_string(), "3".to_string())]);
        assert_eq!(set.cookies.len(), 1);
    }

    #[test]
    fn cookie_header_value_renders_attributes() {
        let cookie = Cookie {
            name: "sid".into(),
            value: "42".into(),
            path: Some("/".into()),
            max_age_secs: Some(3600),
            http_only: true,
        };
        assert_eq!(cookie.header_value(), "sid=42; Path=/; Max-Age=3600; HttpOnly");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-session".to_string(), "abc".to_string());
        let ctx = Context::new(Value::Null, HashMap::new(), HashMap::new(), headers);
        assert_eq!(ctx.header("X-Session"), Some("abc"));
        assert_eq!(ctx.header("missing"), None);
    }
}
