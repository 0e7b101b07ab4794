// Gemini advisory client - Prompts a hosted model for recommendations and forecasts
use crate::application::advisory_provider::{
    AdvisoryError, AdvisoryProvider, AdvisoryRequest, AdvisoryResponse, Forecast,
};
use crate::domain::reading::{CanonicalReading, Parameter};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiAdvisoryProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiAdvisoryProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client,
        })
    }

    /// The API key travels in the `x-goog-api-key` header, never the URL.
    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }
}

#[async_trait]
impl AdvisoryProvider for GeminiAdvisoryProvider {
    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = self
            .client
            .post(self.build_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status(status.as_u16(), body));
        }

        let data = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| AdvisoryError::Unparsable(e.without_url().to_string()))?;

        let text = data
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| AdvisoryError::Unparsable("response has no text part".to_string()))?;

        parse_advice(&text)
    }
}

fn describe(reading: &CanonicalReading, parameter: Parameter) -> String {
    let name = match parameter {
        Parameter::Do => "Dissolved Oxygen (DO)",
        Parameter::Ec => "Electrical Conductivity (EC)",
        Parameter::Tds => "Total Dissolved Solids (TDS)",
        Parameter::Turbidity => "Turbidity",
        Parameter::Ph => "pH",
    };
    let value = reading
        .value(parameter)
        .map(|v| format!("{:.*}", parameter.precision(), v))
        .unwrap_or_else(|| "unavailable".to_string());
    match parameter.unit() {
        Some(unit) => format!("{name}: {value} {unit}"),
        None => format!("{name}: {value}"),
    }
}

pub fn build_prompt(request: &AdvisoryRequest) -> String {
    let mut prompt = String::from(
        "Act as a Senior Water Quality Engineer. Analyze these sensor readings:\n",
    );

    match request {
        AdvisoryRequest::Latest(reading) => {
            for parameter in Parameter::ALL {
                if parameter == Parameter::Ph && reading.ph.is_none() {
                    continue;
                }
                let _ = writeln!(prompt, "- {}", describe(reading, parameter));
            }
            prompt.push_str(
                "\nReturn a JSON array of 4 strings containing high-priority actions.\n\
                 - If TDS > 1000 or Turbidity > 5, emphasize health risks.\n\
                 - If DO < 4, emphasize risks to aquatic life.\n\
                 - Use professional, concise language.\n",
            );
        }
        AdvisoryRequest::Window(readings) => {
            for reading in readings {
                let values: Vec<String> = Parameter::ALL
                    .iter()
                    .map(|p| describe(reading, *p))
                    .collect();
                let _ = writeln!(prompt, "- {}: {}", reading.time, values.join(", "));
            }
            prompt.push_str(
                "\nThe readings are in chronological order. Return a JSON object with two \
                 string fields: \"forecast\", the expected water quality over the next few \
                 hours, and \"analysis\", the trends that support it.\n",
            );
        }
    }

    prompt
}

/// Interprets the model's JSON text as a recommendation list or a forecast.
pub fn parse_advice(text: &str) -> Result<AdvisoryResponse, AdvisoryError> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| AdvisoryError::Unparsable(e.to_string()))?;

    match value {
        Value::Array(items) => {
            let recommendations: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                })
                .collect();
            if recommendations.is_empty() {
                return Err(AdvisoryError::Unparsable(
                    "no recommendation strings".to_string(),
                ));
            }
            Ok(AdvisoryResponse::Recommendations(recommendations))
        }
        Value::Object(_) => serde_json::from_value::<Forecast>(value)
            .map(AdvisoryResponse::Forecast)
            .map_err(|e| AdvisoryError::Unparsable(e.to_string())),
        other => Err(AdvisoryError::Unparsable(format!(
            "unexpected JSON value: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{MethodRouter, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    #[test]
    fn test_parse_recommendation_list() {
        let advice = parse_advice(r#"["Aerate the tank", "  ", 4, "Test again in 1h"]"#).unwrap();
        assert_eq!(
            advice,
            AdvisoryResponse::Recommendations(vec![
                "Aerate the tank".to_string(),
                "Test again in 1h".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_fenced_forecast() {
        let text = "```json\n{\"forecast\": \"Stable\", \"analysis\": \"No drift\"}\n```";
        assert_eq!(
            parse_advice(text).unwrap(),
            AdvisoryResponse::Forecast(Forecast {
                forecast: "Stable".to_string(),
                analysis: "No drift".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_unusable_text() {
        assert!(matches!(parse_advice("Sure! Here you go"), Err(AdvisoryError::Unparsable(_))));
        assert!(matches!(parse_advice("[]"), Err(AdvisoryError::Unparsable(_))));
        assert!(matches!(parse_advice("42"), Err(AdvisoryError::Unparsable(_))));
        assert!(matches!(
            parse_advice(r#"{"forecast": "Stable"}"#),
            Err(AdvisoryError::Unparsable(_))
        ));
    }

    #[test]
    fn test_latest_prompt_lists_readings() {
        let reading = CanonicalReading::new("10:00")
            .with_value(Parameter::Do, Some(3.456))
            .with_value(Parameter::Tds, Some(1200.4));
        let prompt = build_prompt(&AdvisoryRequest::Latest(reading));

        assert!(prompt.contains("- Dissolved Oxygen (DO): 3.46 mg/L"));
        assert!(prompt.contains("- Electrical Conductivity (EC): unavailable μS/cm"));
        assert!(prompt.contains("- Total Dissolved Solids (TDS): 1200 ppm"));
        assert!(!prompt.contains("pH"));
        assert!(prompt.contains("JSON array of 4 strings"));
    }

    #[test]
    fn test_window_prompt_lists_rows() {
        let readings = vec![
            CanonicalReading::new("10:00").with_value(Parameter::Ph, Some(7.0)),
            CanonicalReading::new("10:05").with_value(Parameter::Ph, Some(7.2)),
        ];
        let prompt = build_prompt(&AdvisoryRequest::Window(readings));

        assert!(prompt.contains("- 10:00: "));
        assert!(prompt.contains("pH: 7.20"));
        assert!(prompt.contains("\"forecast\""));
    }

    #[test]
    fn test_build_url_leaves_key_out() {
        let provider = provider("https://generativelanguage.googleapis.com/".to_string());

        assert_eq!(
            provider.build_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/test-model:generateContent"
        );
    }

    const API_KEY: &str = "gemini-test-key";
    const GENERATE: &str = "/v1beta/models/:action";

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> GeminiAdvisoryProvider {
        GeminiAdvisoryProvider::new(
            base_url,
            API_KEY.to_string(),
            "test-model".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn envelope(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    /// A generateContent handler that checks the auth header and the JSON
    /// response mode before answering with `reply`.
    fn generate(reply: Value) -> MethodRouter {
        post(
            move |Path(action): Path<String>,
                  headers: HeaderMap,
                  Query(params): Query<HashMap<String, String>>,
                  Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    if action != "test-model:generateContent" {
                        return StatusCode::NOT_FOUND.into_response();
                    }
                    let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
                    if key != Some(API_KEY) || params.contains_key("key") {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    if body["generationConfig"]["responseMimeType"] != "application/json" {
                        return StatusCode::BAD_REQUEST.into_response();
                    }
                    Json(reply).into_response()
                }
            },
        )
    }

    fn latest_request() -> AdvisoryRequest {
        AdvisoryRequest::Latest(
            CanonicalReading::new("10:00").with_value(Parameter::Do, Some(3.5)),
        )
    }

    #[tokio::test]
    async fn test_advise_returns_recommendations() {
        let reply = envelope(r#"["Aerate the tank", "Retest DO in one hour"]"#);
        let base = serve(Router::new().route(GENERATE, generate(reply))).await;

        let advice = provider(base).advise(&latest_request()).await.unwrap();
        assert_eq!(
            advice,
            AdvisoryResponse::Recommendations(vec![
                "Aerate the tank".to_string(),
                "Retest DO in one hour".to_string()
            ])
        );
    }

    #[tokio::test]
    async fn test_advise_returns_forecast() {
        let reply = envelope(r#"{"forecast": "Stable", "analysis": "DO holding at 7"}"#);
        let base = serve(Router::new().route(GENERATE, generate(reply))).await;

        let request = AdvisoryRequest::Window(vec![
            CanonicalReading::new("10:00").with_value(Parameter::Do, Some(7.0)),
            CanonicalReading::new("10:05").with_value(Parameter::Do, Some(7.1)),
        ]);
        let advice = provider(base).advise(&request).await.unwrap();
        assert_eq!(
            advice,
            AdvisoryResponse::Forecast(Forecast {
                forecast: "Stable".to_string(),
                analysis: "DO holding at 7".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_advise_without_text_part_is_unparsable() {
        let base = serve(
            Router::new()
                .route(GENERATE, generate(json!({ "candidates": [] })))
                .route(
                    &format!("/blocked{GENERATE}"),
                    generate(json!({ "candidates": [{ "content": { "parts": [] } }] })),
                ),
        )
        .await;

        let result = provider(base.clone()).advise(&latest_request()).await;
        assert!(matches!(result, Err(AdvisoryError::Unparsable(_))));

        let result = provider(format!("{base}/blocked")).advise(&latest_request()).await;
        assert!(matches!(result, Err(AdvisoryError::Unparsable(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_maps_to_status() {
        let base = serve(Router::new().route(
            GENERATE,
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        ))
        .await;

        let result = provider(base).advise(&latest_request()).await;
        match result {
            Err(AdvisoryError::Status(status, body)) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(format!("http://{addr}"))
            .advise(&latest_request())
            .await
            .unwrap_err();

        assert!(matches!(err, AdvisoryError::Transport(_)));
        let logged = format!("Advisory unavailable, using fallback: {err}");
        assert!(!logged.contains(API_KEY));
        assert!(!logged.contains("generateContent"));
    }
}
