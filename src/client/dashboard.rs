use std::fmt::Write;

use serde::Deserialize;

use crate::auth::AccessToken;
use crate::helpers::format_epoch;
use crate::offline::{CacheStorage, FetchResponse, Network, OfflineWorker, Source};
use crate::routes::ApiRoute;

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reading {
    #[serde(rename = "TimeStamp", alias = "timestamp", default)]
    pub timestamp: Option<i64>,
    #[serde(rename = "Power", alias = "power")]
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentAndMax {
    #[serde(alias = "Current")]
    pub current: Reading,
    #[serde(alias = "Max")]
    pub max: Reading,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YieldEntry {
    #[serde(rename = "TimeStamp", alias = "timestamp")]
    pub timestamp: i64,
    #[serde(rename = "Yield", alias = "yield")]
    pub energy: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Gauges {
    pub current: Option<Reading>,
    pub peak: Option<Reading>,
    pub today: Vec<Reading>,
    pub yearly: Vec<YieldEntry>,
}

/// What a round of polling amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated,
    Offline,
    /// The gateway rejected the credential; the session must be cleared
    Unauthorized,
}

/// Owns all dashboard state. Responses are applied to it one endpoint at a time.
#[derive(Debug, Default)]
pub struct DashboardController {
    gauges: Gauges,
    offline: bool,
    stale: bool,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gauges(&self) -> &Gauges {
        &self.gauges
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Whether some values came from the offline cache rather than the network.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn apply_current(&mut self, reading: Reading) {
        self.gauges.current = Some(reading);
    }

    pub fn apply_current_and_max(&mut self, values: CurrentAndMax) {
        self.gauges.current = Some(values.current);
        self.gauges.peak = Some(values.max);
    }

    pub fn apply_today(&mut self, readings: Vec<Reading>) {
        self.gauges.today = readings;
    }

    pub fn apply_yearly_yield(&mut self, entries: Vec<YieldEntry>) {
        self.gauges.yearly = entries;
    }

    /// Apply one endpoint's response. Values are only replaced by a successful
    /// response with a parseable body.
    pub fn apply(&mut self, route: ApiRoute, response: &FetchResponse) -> PollOutcome {
        if response.is_offline() {
            self.offline = true;
            return PollOutcome::Offline;
        }
        if response.status == UNAUTHORIZED {
            return PollOutcome::Unauthorized;
        }
        if !response.is_ok() {
            log::warn!("{} answered {}", route.path(), response.status);
            return PollOutcome::Updated;
        }

        let parsed = match route {
            ApiRoute::Current => response.json().map(|r| self.apply_current(r)),
            ApiRoute::CurrentAndMax => response.json().map(|v| self.apply_current_and_max(v)),
            ApiRoute::Today => response.json().map(|r| self.apply_today(r)),
            ApiRoute::YearlyYield => response.json().map(|y| self.apply_yearly_yield(y)),
        };
        if let Err(e) = parsed {
            log::warn!("Ignoring malformed {} payload: {e}", route.path());
        }
        PollOutcome::Updated
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Solar dashboard");
        if self.offline {
            out.push_str(" [OFFLINE]");
        } else if self.stale {
            out.push_str(" [cached]");
        }
        out.push('\n');

        let _ = writeln!(out, "Current power: {}", describe(self.gauges.current.as_ref()));
        let _ = writeln!(out, "Today's peak:  {}", describe(self.gauges.peak.as_ref()));
        let _ = writeln!(out, "Today:         {} readings", self.gauges.today.len());
        if self.gauges.yearly.is_empty() {
            let _ = writeln!(out, "Yearly yield:  -");
        }
        for entry in &self.gauges.yearly {
            let _ = writeln!(
                out,
                "Yearly yield:  {} {:.1} kWh",
                format_epoch(entry.timestamp),
                entry.energy
            );
        }
        out
    }
}

fn describe(reading: Option<&Reading>) -> String {
    match reading {
        None => "-".to_string(),
        Some(Reading {
            power,
            timestamp: Some(ts),
        }) => format!("{power:.0} W ({})", format_epoch(*ts)),
        Some(Reading {
            power,
            timestamp: None,
        }) => format!("{power:.0} W"),
    }
}

/// Refresh every gauge through the offline worker.
pub fn poll_once<S, N>(
    worker: &OfflineWorker<S, N>,
    controller: &mut DashboardController,
    token: Option<&AccessToken>,
) -> anyhow::Result<PollOutcome>
where
    S: CacheStorage + 'static,
    N: Network,
{
    controller.offline = false;
    controller.stale = false;

    let mut outcome = PollOutcome::Updated;
    for route in ApiRoute::ALL {
        let request = worker.request_for(route.path(), token)?;
        let handled = worker.dispatch(&request);
        if handled.source == Source::Cache {
            controller.stale = true;
        }
        match controller.apply(route, &handled.response) {
            PollOutcome::Unauthorized => return Ok(PollOutcome::Unauthorized),
            PollOutcome::Offline => outcome = PollOutcome::Offline,
            PollOutcome::Updated => {}
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::offline::ResponseKind;

    fn json(status: u16, body: &str) -> FetchResponse {
        FetchResponse {
            status,
            kind: ResponseKind::Basic,
            headers: BTreeMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn applies_each_endpoint() {
        let mut dashboard = DashboardController::new();
        dashboard.apply(ApiRoute::Current, &json(200, r#"{"TimeStamp": 0, "Power": 1200}"#));
        assert_eq!(dashboard.gauges().current.as_ref().unwrap().power, 1200.0);

        dashboard.apply(
            ApiRoute::CurrentAndMax,
            &json(
                200,
                r#"{"current": {"TimeStamp": 10, "Power": 900},
                    "max": {"TimeStamp": 5, "Power": 3400}}"#,
            ),
        );
        assert_eq!(dashboard.gauges().current.as_ref().unwrap().power, 900.0);
        assert_eq!(dashboard.gauges().peak.as_ref().unwrap().power, 3400.0);

        dashboard.apply(
            ApiRoute::Today,
            &json(200, r#"[{"TimeStamp": 1, "Power": 1}, {"TimeStamp": 2, "Power": 2}]"#),
        );
        assert_eq!(dashboard.gauges().today.len(), 2);

        dashboard.apply(
            ApiRoute::YearlyYield,
            &json(200, r#"[{"TimeStamp": 1714564800, "Yield": 5120.5}]"#),
        );
        assert_eq!(dashboard.gauges().yearly[0].energy, 5120.5);
    }

    #[test]
    fn lowercase_power_is_accepted() {
        let mut dashboard = DashboardController::new();
        dashboard.apply(ApiRoute::Current, &json(200, r#"{"power": 1200}"#));
        let current = dashboard.gauges().current.clone().unwrap();
        assert_eq!(current.power, 1200.0);
        assert_eq!(current.timestamp, None);
    }

    #[test]
    fn offline_keeps_last_values() {
        let mut dashboard = DashboardController::new();
        dashboard.apply(ApiRoute::Current, &json(200, r#"{"Power": 700}"#));

        let outcome = dashboard.apply(ApiRoute::Current, &FetchResponse::offline());
        assert_eq!(outcome, PollOutcome::Offline);
        assert!(dashboard.is_offline());
        assert_eq!(dashboard.gauges().current.as_ref().unwrap().power, 700.0);
        assert!(dashboard.render().contains("[OFFLINE]"));
    }

    #[test]
    fn unauthorized_and_malformed_leave_state_alone() {
        let mut dashboard = DashboardController::new();
        let before = dashboard.gauges().clone();

        let outcome = dashboard.apply(
            ApiRoute::Today,
            &json(401, r#"{"error":"Unauthorized"}"#),
        );
        assert_eq!(outcome, PollOutcome::Unauthorized);

        let outcome = dashboard.apply(ApiRoute::Today, &json(200, "not json"));
        assert_eq!(outcome, PollOutcome::Updated);
        assert_eq!(dashboard.gauges(), &before);
    }

    #[test]
    fn render_summary() {
        let mut dashboard = DashboardController::new();
        dashboard.apply_current(Reading {
            timestamp: Some(1714564800),
            power: 1234.4,
        });
        let text = dashboard.render();
        assert!(text.starts_with("Solar dashboard\n"));
        assert!(text.contains("Current power: 1234 W (2024-05-01 12:00 UTC)"));
        assert!(text.contains("Today's peak:  -"));
        assert!(text.contains("Yearly yield:  -"));
    }
}
