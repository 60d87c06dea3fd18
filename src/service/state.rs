use crate::config::DisplayConfig;
use crate::policies::{NormalizedPolicy, PolicyNormalizer, PolicyScreen, RawPolicyRecord};
use chrono::{Local, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
    pub display: Arc<DisplayConfig>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, display: DisplayConfig) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            display: Arc::new(display),
        }
    }

    pub fn normalize(
        &self,
        screen: PolicyScreen,
        today: NaiveDate,
        records: Vec<RawPolicyRecord>,
    ) -> Vec<NormalizedPolicy> {
        PolicyNormalizer::new(today, screen.company_fallback(&self.display)).normalize_all(records)
    }
}

pub fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_requires_iso_format() {
        assert_eq!(
            parse_date(" 2024-06-01 "),
            Ok(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"))
        );
        assert!(parse_date("01/06/2024").is_err());
    }

    #[test]
    fn explicit_today_is_kept() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        assert_eq!(today_or_local(Some(date)), date);
    }
}
