// Poll cycle - fetch, validate, format, and map failures to display states
use crate::application::fetcher::{FetchError, fetch, parse_endpoint};
use crate::application::formatter::{format_label, format_tooltip};
use crate::application::http_client::HttpClient;
use crate::application::response_validator::{self, DataError};
use crate::domain::display::{DisplayKind, DisplayState};
use crate::infrastructure::config::PanelConfig;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl CycleError {
    pub fn kind(&self) -> DisplayKind {
        match self {
            CycleError::Fetch(FetchError::MissingEndpoint | FetchError::InvalidEndpoint(_)) => {
                DisplayKind::ConfigError
            }
            CycleError::Fetch(FetchError::Status(_) | FetchError::Transport(_)) => {
                DisplayKind::TransportError
            }
            CycleError::Fetch(FetchError::EmptyResponse) => DisplayKind::EmptyResponse,
            CycleError::Data(_) => DisplayKind::DataError,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CycleError::Fetch(FetchError::MissingEndpoint | FetchError::InvalidEndpoint(_)) => {
                "Config Err"
            }
            CycleError::Fetch(FetchError::Status(_) | FetchError::Transport(_)) => "Err",
            CycleError::Fetch(FetchError::EmptyResponse) => "Empty",
            CycleError::Data(_) => "Data Err",
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            CycleError::Fetch(FetchError::MissingEndpoint) => {
                "Please configure the API endpoint in the panel settings".to_string()
            }
            CycleError::Fetch(e @ FetchError::InvalidEndpoint(_)) => {
                format!("Please fix the API endpoint: {}", e)
            }
            CycleError::Fetch(FetchError::EmptyResponse) => {
                "Empty response received from device".to_string()
            }
            CycleError::Fetch(e) => format!("Error fetching data: {}", e),
            CycleError::Data(e) => format!("Error processing data: {}", e),
        }
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            CycleError::Fetch(e) => e.reason_code(),
            CycleError::Data(e) => e.reason_code(),
        }
    }
}

/// Label and tooltip derived from a valid reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub label: String,
    pub tooltip: String,
    pub at: DateTime<Local>,
}

pub type CycleOutcome = Result<Rendered, CycleError>;

pub async fn run_cycle(
    config: &PanelConfig,
    client: Result<&dyn HttpClient, FetchError>,
) -> CycleOutcome {
    // Configuration problems win over a client that failed to build
    parse_endpoint(config.endpoint.as_deref())?;

    let body = fetch(client?, config.endpoint.as_deref()).await?;
    let reading = response_validator::parse(&body)?;

    let at = Local::now();
    Ok(Rendered {
        label: format_label(reading.power_watts, config.use_eu_format),
        tooltip: format_tooltip(&reading, config, &at),
        at,
    })
}

/// Build the next display state. Failures keep the previous update time.
pub fn next_state(outcome: &CycleOutcome, previous: &DisplayState) -> DisplayState {
    match outcome {
        Ok(rendered) => {
            DisplayState::ok(rendered.label.clone(), rendered.tooltip.clone(), rendered.at)
        }
        Err(e) => DisplayState::failed(e.kind(), e.label(), e.tooltip(), previous.last_update),
    }
}

pub fn log_failure(cycle: u64, error: &CycleError) {
    match error.kind() {
        DisplayKind::ConfigError => tracing::warn!(
            cycle,
            reason = error.reason_code(),
            detail = %error,
            "Poll skipped, endpoint configuration missing or invalid"
        ),
        _ => tracing::error!(
            cycle,
            reason = error.reason_code(),
            detail = %error,
            "Poll cycle failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::http_client::HttpResponse;
    use async_trait::async_trait;

    struct BodyClient(&'static str);

    #[async_trait]
    impl HttpClient for BodyClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse::new(200, self.0))
        }
    }

    fn config() -> PanelConfig {
        PanelConfig {
            endpoint: Some("http://plug.local/rpc/Switch.GetStatus?id=0".to_string()),
            ..PanelConfig::default()
        }
    }

    #[tokio::test]
    async fn test_cycle_renders_reading() {
        let client = BodyClient(
            r#"{"apower":150.2,"voltage":230.1,"current":0.653,"temperature":{"tC":42.3}}"#,
        );
        let rendered = run_cycle(&config(), Ok(&client)).await.unwrap();

        assert_eq!(rendered.label, "☀️ 150.2 W");
        assert!(rendered.tooltip.starts_with("Power: 150.2 W\nVoltage: 230.1 V\n"));
        assert!(rendered.tooltip.contains("Current: 0.653 A"));
        assert!(rendered.tooltip.contains("Temperature: 42.3 °C"));
        assert!(rendered.tooltip.contains("Last updated: "));
    }

    #[tokio::test]
    async fn test_cycle_maps_data_errors() {
        let client = BodyClient(r#"{"apower":1,"voltage":1,"current":1,"temperature":{}}"#);
        let err = run_cycle(&config(), Ok(&client)).await.unwrap_err();

        assert_eq!(err.kind(), DisplayKind::DataError);
        assert_eq!(err.label(), "Data Err");
        assert_eq!(err.tooltip(), "Error processing data: invalid data types");
    }

    #[tokio::test]
    async fn test_config_error_reported_before_client_error() {
        let unset = PanelConfig::default();
        let err = run_cycle(&unset, Err(FetchError::Transport("no tls backend".into())))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DisplayKind::ConfigError);
        assert_eq!(err.label(), "Config Err");

        let err = run_cycle(&config(), Err(FetchError::Transport("no tls backend".into())))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DisplayKind::TransportError);
    }

    #[tokio::test]
    async fn test_cycle_prints_negative_zero_unsigned() {
        let client = BodyClient(
            r#"{"apower":-0,"voltage":230.0,"current":-0.0,"temperature":{"tC":-0.0}}"#,
        );
        let rendered = run_cycle(&config(), Ok(&client)).await.unwrap();

        assert_eq!(rendered.label, crate::application::formatter::ICON_SLEEP);
        assert!(rendered.tooltip.starts_with("Power: 0.0 W\n"));
        assert!(rendered.tooltip.contains("Current: 0.000 A"));
        assert!(rendered.tooltip.contains("Temperature: 0.0 °C"));
    }

    #[test]
    fn test_failure_labels() {
        let cases = [
            (CycleError::from(FetchError::Status(500)), "Err", DisplayKind::TransportError),
            (
                CycleError::from(FetchError::Transport("reset".into())),
                "Err",
                DisplayKind::TransportError,
            ),
            (CycleError::from(FetchError::EmptyResponse), "Empty", DisplayKind::EmptyResponse),
            (
                CycleError::from(FetchError::InvalidEndpoint("x".into())),
                "Config Err",
                DisplayKind::ConfigError,
            ),
            (CycleError::from(DataError::Decode), "Data Err", DisplayKind::DataError),
        ];
        for (error, label, kind) in cases {
            assert_eq!(error.label(), label);
            assert_eq!(error.kind(), kind);
        }
        assert_eq!(
            CycleError::from(FetchError::Status(503)).tooltip(),
            "Error fetching data: HTTP request failed with status 503"
        );
    }

    #[test]
    fn test_failure_keeps_last_update() {
        let at = Local::now();
        let previous = DisplayState::ok("☀️ 1.0 W".into(), "tooltip".into(), at);

        let next = next_state(&Err(FetchError::EmptyResponse.into()), &previous);
        assert_eq!(next.kind, DisplayKind::EmptyResponse);
        assert_eq!(next.label, "Empty");
        assert_eq!(next.last_update, Some(at));
    }
}
