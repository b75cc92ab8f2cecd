//! HTTP methods used by API clients.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
}

/// When a request built for a method carries a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Never: only headers and options are produced.
    Never,
    /// Only when the call supplies a payload explicitly.
    WhenProvided,
    /// Always: the global payload is sent even without a per-call payload.
    Always,
}

impl Method {
    /// Body policy for this method.
    #[must_use]
    pub const fn body_policy(&self) -> BodyPolicy {
        match self {
            Self::Get | Self::Head => BodyPolicy::Never,
            Self::Delete => BodyPolicy::WhenProvided,
            Self::Post | Self::Put | Self::Patch => BodyPolicy::Always,
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Head => Self::HEAD,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn get_class_methods_never_carry_a_body() {
        assert_eq!(Method::Get.body_policy(), BodyPolicy::Never);
        assert_eq!(Method::Head.body_policy(), BodyPolicy::Never);
        assert_eq!(Method::Post.body_policy(), BodyPolicy::Always);
        assert_eq!(Method::Delete.body_policy(), BodyPolicy::WhenProvided);
    }

    #[test]
    fn method_into_http() {
        assert_eq!(http::Method::from(Method::Get), http::Method::GET);
        assert_eq!(http::Method::from(Method::Patch), http::Method::PATCH);
    }
}
