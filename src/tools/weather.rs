//! Current weather lookup through OpenWeatherMap.

use super::{endpoint, ToolReport};
use crate::config::ToolSettings;
use crate::error::Result;
use serde::Deserialize;
use tracing::instrument;

pub struct WeatherTool {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct WeatherResponse {
    main: Option<MainReading>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

impl WeatherTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings, api_key: &str) -> Self {
        Self {
            client,
            url: settings.weather_url.clone(),
            api_key: api_key.to_string(),
        }
    }

    /// Look up the weather for a city.
    ///
    /// Unknown cities (and any response without a `main` reading) produce a failed report
    /// rather than an error; transport failures are errors.
    #[instrument(skip(self))]
    pub async fn run(&self, city: &str) -> Result<ToolReport> {
        let mut url = endpoint(&self.url)?;
        url.query_pairs_mut()
            .append_pair("q", city)
            .append_pair("appid", &self.api_key);

        // OpenWeatherMap reports unknown cities as 404 with a JSON body.
        let body: serde_json::Value = self.client.get(url).send().await?.json().await?;
        Ok(report_from(city, body))
    }
}

fn report_from(city: &str, body: serde_json::Value) -> ToolReport {
    let parsed: WeatherResponse = match serde_json::from_value(body) {
        Ok(parsed) => parsed,
        Err(_) => return ToolReport::failed("City not found"),
    };

    let Some(main) = parsed.main else {
        return ToolReport::failed("City not found");
    };

    let celsius = ((main.temp - 273.15) * 100.0).round() / 100.0;
    let description = parsed
        .weather
        .first()
        .map(|c| c.description.as_str())
        .unwrap_or_default();

    ToolReport::completed(format!(
        "Weather in {}: {}°C, {}",
        city,
        super::Number::Float(celsius),
        description
    ))
}
