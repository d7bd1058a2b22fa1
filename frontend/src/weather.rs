use serde::Deserialize;

/// Current conditions for Hyderabad (17.38 N, 78.48 E).
pub const FORECAST_URL: &str =
    "https://api.open-meteo.com/v1/forecast?latitude=17.38&longitude=78.48&current_weather=true";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Forecast {
    pub current_weather: CurrentWeather,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherInfo {
    pub description: &'static str,
    /// Font Awesome icon class.
    pub icon: &'static str,
}

/// Maps a WMO weather interpretation code to a label and icon.
pub fn weather_info(code: u16) -> WeatherInfo {
    let (description, icon) = match code {
        0 => ("Clear sky", "fa-sun"),
        1 => ("Mainly clear", "fa-sun"),
        2 => ("Partly cloudy", "fa-cloud-sun"),
        3 => ("Overcast", "fa-cloud"),
        45 => ("Fog", "fa-smog"),
        48 => ("Depositing rime fog", "fa-smog"),
        51 => ("Light drizzle", "fa-cloud-rain"),
        53 => ("Moderate drizzle", "fa-cloud-rain"),
        55 => ("Dense drizzle", "fa-cloud-rain"),
        61 => ("Slight rain", "fa-cloud-showers-heavy"),
        63 => ("Moderate rain", "fa-cloud-showers-heavy"),
        65 => ("Heavy rain", "fa-cloud-showers-heavy"),
        80 => ("Slight rain showers", "fa-cloud-bolt"),
        81 => ("Moderate rain showers", "fa-cloud-bolt"),
        82 => ("Violent rain showers", "fa-cloud-bolt"),
        95 => ("Thunderstorm", "fa-bolt"),
        _ => ("Unknown", "fa-sun"),
    };
    WeatherInfo { description, icon }
}
