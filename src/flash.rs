use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::str::FromStr;
use tracing::warn;
use url::form_urlencoded;

/// Cookie carrying a one-shot message across a redirect
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FlashKind {
    Notice,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Notice,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Cookie value form: `notice=Successfully+created+item.`
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.kind.to_string(), &self.message)
            .finish()
    }

    pub fn decode(raw: &str) -> Option<Self> {
        form_urlencoded::parse(raw.as_bytes()).find_map(|(kind, message)| {
            FlashKind::from_str(&kind).ok().map(|kind| Self {
                kind,
                message: message.into_owned(),
            })
        })
    }

    fn set_cookie(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.encode()
        ))
        .ok()
    }
}

/// Header value that expires the flash cookie
pub fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// `302 Found` redirect, optionally carrying a flash message
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    location: String,
    flash: Option<Flash>,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
        }
    }

    pub fn with_notice(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(Flash::notice(message));
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(Flash::error(message));
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.location) {
            Ok(location) => location,
            Err(e) => {
                warn!(location = %self.location, error = %e, "Unencodable redirect location");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = StatusCode::FOUND.into_response();
        response.headers_mut().insert(header::LOCATION, location);

        if let Some(cookie) = self.flash.as_ref().and_then(Flash::set_cookie) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }

        response
    }
}

/// Flash message sent back by the browser, if any.
///
/// A view that receives one must clear the cookie so the message shows once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingFlash(pub Option<Flash>);

impl IncomingFlash {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let flash = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == FLASH_COOKIE)
            .find_map(|(_, value)| Flash::decode(value));
        Self(flash)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
