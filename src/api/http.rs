use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ApiError, ResortApi, ResortPayload, ScrapeRequest, SkiPassApi, UserApi};
use crate::record::{RecordId, Resort, SkiPass, User, UserUpdate};

/// Backend reached over HTTP with a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("resort-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send `request` and turn non-success statuses into errors.
    ///
    /// `subject` names the thing being addressed, for `NotFound` messages.
    fn send(&self, request: RequestBuilder, subject: &str) -> Result<Response, ApiError> {
        let started = Instant::now();
        let response = request.send().map_err(|err| {
            tracing::warn!(%subject, error = %err, "request failed");
            ApiError::from(err)
        })?;
        let status = response.status();
        tracing::debug!(
            %subject,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "response"
        );
        if status.is_success() {
            return Ok(response);
        }
        let err = if status == reqwest::StatusCode::NOT_FOUND {
            ApiError::NotFound(subject.to_string())
        } else {
            let body = response.text().unwrap_or_default();
            ApiError::rejected(status.as_u16(), &body)
        };
        tracing::warn!(%subject, code = err.code().as_str(), error = %err, "request rejected");
        Err(err)
    }

    fn delete(&self, path: &str, subject: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path)), subject)?;
        Ok(())
    }

    fn submit_resort(
        &self,
        request: RequestBuilder,
        payload: ResortPayload,
        subject: &str,
    ) -> Result<Option<Resort>, ApiError> {
        let form = payload.into_form()?;
        let body = self.send(request.multipart(form), subject)?.text()?;
        decode_record_body(&body)
    }
}

/// Parse a JSON body into `T`.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}

/// Record responses come either bare or wrapped as `{data: {...}}`.
/// An empty body yields `None`.
fn decode_record_body<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)?;
    let record = match value.get("data") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    Ok(Some(serde_json::from_value(record)?))
}

/// User lists come wrapped as `{users: [...]}`; a bare array is accepted too.
fn decode_users(value: Value) -> Result<Vec<User>, ApiError> {
    let list = match value {
        Value::Object(mut map) => map
            .remove("users")
            .ok_or_else(|| ApiError::Decode("missing `users` member".to_string()))?,
        other => other,
    };
    Ok(serde_json::from_value(list)?)
}

impl ResortApi for HttpBackend {
    fn fetch_resorts(&self) -> Result<Vec<Resort>, ApiError> {
        let response = self.send(self.client.get(self.url("/resorts")), "resorts")?;
        let resorts: Vec<Resort> = decode(response)?;
        tracing::info!(count = resorts.len(), "fetched resorts");
        Ok(resorts)
    }

    fn create_resort(&self, resort: &Resort) -> Result<Resort, ApiError> {
        let request = self.client.post(self.url("/resorts/ingest"));
        self.submit_resort(request, ResortPayload::for_create(resort), "resort ingest")?
            .ok_or_else(|| ApiError::Decode("empty response to resort ingest".to_string()))
    }

    fn update_resort(&self, resort: &Resort) -> Result<Resort, ApiError> {
        let subject = format!("resort {}", resort.id);
        let request = self.client.put(self.url(&format!("/resorts/{}", resort.id)));
        let stored = self.submit_resort(request, ResortPayload::for_update(resort), &subject)?;
        Ok(stored.unwrap_or_else(|| resort.clone()))
    }

    fn delete_resort(&self, id: &RecordId) -> Result<(), ApiError> {
        self.delete(&format!("/resorts/{id}"), &format!("resort {id}"))
    }

    fn scrape_and_ingest(&self, request: &ScrapeRequest) -> Result<Resort, ApiError> {
        let builder = self
            .client
            .post(self.url("/resorts/scrape-and-ingest"))
            .json(request);
        let body = self.send(builder, "scrape")?.text()?;
        decode_record_body(&body)?
            .ok_or_else(|| ApiError::Decode("empty response to scrape".to_string()))
    }
}

impl SkiPassApi for HttpBackend {
    fn fetch_ski_passes(&self) -> Result<Vec<SkiPass>, ApiError> {
        decode(self.send(self.client.get(self.url("/api/ski-passes")), "ski passes")?)
    }

    fn create_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        let ingest = self.client.post(self.url("/api/ski-passes/ingest")).json(pass);
        let response = match self.send(ingest, "ski pass ingest") {
            // Older backends only expose the plain collection route.
            Err(ApiError::NotFound(_)) => {
                let plain = self.client.post(self.url("/api/ski-passes")).json(pass);
                self.send(plain, "ski pass create")?
            }
            other => other?,
        };
        decode_record_body(&response.text()?)?
            .ok_or_else(|| ApiError::Decode("empty response to ski pass create".to_string()))
    }

    fn update_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("/api/ski-passes/{}", pass.id)))
            .json(pass);
        let body = self.send(request, &format!("ski pass {}", pass.id))?.text()?;
        let stored: Option<SkiPass> = decode_record_body(&body)?;
        Ok(stored.unwrap_or_else(|| pass.clone()))
    }

    fn delete_ski_pass(&self, id: &RecordId) -> Result<(), ApiError> {
        self.delete(&format!("/api/ski-passes/{id}"), &format!("ski pass {id}"))
    }
}

impl UserApi for HttpBackend {
    fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        decode_users(decode(self.send(self.client.get(self.url("/users/all")), "users")?)?)
    }

    fn update_user(&self, id: &RecordId, update: &UserUpdate) -> Result<User, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("/users/update/{id}")))
            .json(update);
        let value: Value = decode(self.send(request, &format!("user {id}"))?)?;
        let record = match value.get("user") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => value,
        };
        Ok(serde_json::from_value(record)?)
    }

    fn delete_user(&self, id: &RecordId) -> Result<(), ApiError> {
        self.delete(&format!("/users/delete/{id}"), &format!("user {id}"))
    }
}
