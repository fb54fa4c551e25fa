//! Status display.
//!
//! Keeps the last status it printed and, on every notification batch,
//! prints only the facets that changed since. Unknown facets are not shown.

use std::sync::Arc;

use tracing::debug;

use onkyo_client::{ConnectionState, ReceiverClient, StatusHandle};
use onkyo_core::{Facet, FacetValue, ReceiverStatus};

/// What a notification batch calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    /// Facets whose value differs from the last printed status
    pub changed: Vec<Facet>,
    /// Ask the daemon for the full main zone status
    pub query_main: bool,
    /// Ask the daemon for the full zone 2 status
    pub query_zone2: bool,
    /// Ask for the sleep timer, which full status reports leave out
    pub query_sleep: bool,
}

/// Compare the last printed status with the current one.
///
/// A full status query is due for a zone when its power has just turned on,
/// or when it is on and the connection epoch moved (the values on record
/// predate a reconnect). Either one also calls for the sleep timer.
#[must_use]
pub fn plan_refresh(known: &ReceiverStatus, current: &ReceiverStatus) -> Refresh {
    let reconnected = known.epoch != current.epoch;
    let due = |before: Option<bool>, now: Option<bool>| now == Some(true) && (before != Some(true) || reconnected);

    let query_main = due(known.power, current.power);
    let query_zone2 = due(known.zone2power, current.zone2power);
    Refresh {
        changed: known.changed_facets(current),
        query_main,
        query_zone2,
        query_sleep: query_main || query_zone2,
    }
}

/// One facet as a display line.
#[must_use]
pub fn format_facet(facet: Facet, value: &FacetValue) -> String {
    match (facet, value) {
        (Facet::Sleep, FacetValue::Int(0)) => format!("{facet}: off"),
        (Facet::Sleep, FacetValue::Int(minutes)) => format!("{facet}: {minutes} min"),
        _ => format!("{facet}: {value}"),
    }
}

/// Every known facet, one per line.
#[must_use]
pub fn render_status(status: &ReceiverStatus) -> String {
    let lines: Vec<String> = status
        .iter()
        .filter_map(|(facet, value)| value.map(|v| format!("  {}", format_facet(facet, &v))))
        .collect();

    if lines.is_empty() { "  (nothing known yet)".to_string() } else { lines.join("\n") }
}

/// Console frontend state.
#[derive(Debug)]
pub struct Frontend {
    status: StatusHandle,
    known: ReceiverStatus,
}

impl Frontend {
    /// Display the status published through `status`.
    #[must_use]
    pub fn new(status: StatusHandle) -> Self {
        Self { status, known: ReceiverStatus::new() }
    }

    /// The latest published status.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ReceiverStatus> {
        self.status.load()
    }

    /// Print what changed and issue any follow-up queries.
    pub async fn refresh(&mut self, client: &mut ReceiverClient) {
        let current = self.snapshot();
        let plan = plan_refresh(&self.known, &current);

        for facet in &plan.changed {
            if let Some(value) = current.get(*facet) {
                println!("{}", format_facet(*facet, &value));
            }
        }
        self.known = ReceiverStatus::clone(&current);

        if plan.query_main {
            debug!("Main zone powered, querying full status");
            client.query_status().await;
        }
        if plan.query_zone2 {
            debug!("Zone 2 powered, querying full status");
            client.query_zone2_status().await;
        }
        if plan.query_sleep {
            client.query_sleep().await;
        }
    }
}

/// Report a connection state change.
pub fn print_connection_state(state: ConnectionState) {
    match state {
        ConnectionState::Connected => println!("[connected]"),
        ConnectionState::Disconnected => println!("[disconnected, waiting to reconnect]"),
        ConnectionState::Connecting => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use onkyo_client::{ClientConfig, Delivery};

    fn powered(epoch: u64) -> ReceiverStatus {
        ReceiverStatus { power: Some(true), epoch, ..ReceiverStatus::default() }
    }

    #[test]
    fn test_power_turning_on_queries_status() {
        let known = ReceiverStatus { power: Some(false), epoch: 1, ..ReceiverStatus::default() };
        let plan = plan_refresh(&known, &powered(1));

        assert_eq!(plan.changed, [Facet::Power]);
        assert!(plan.query_main);
        assert!(!plan.query_zone2);
        assert!(plan.query_sleep);
    }

    #[test]
    fn test_power_first_reported_on_queries_status() {
        let plan = plan_refresh(&ReceiverStatus::new(), &powered(1));
        assert!(plan.query_main);
    }

    #[test]
    fn test_power_staying_on_does_not_requery() {
        let known = ReceiverStatus { volume: Some(10), ..powered(1) };
        let current = ReceiverStatus { volume: Some(20), ..powered(1) };
        let plan = plan_refresh(&known, &current);

        assert_eq!(plan.changed, [Facet::Volume]);
        assert!(!plan.query_main);
        assert!(!plan.query_sleep);
    }

    #[test]
    fn test_reconnect_with_power_on_requeries() {
        let plan = plan_refresh(&powered(1), &powered(2));

        assert!(plan.changed.is_empty());
        assert!(plan.query_main);
        assert!(plan.query_sleep);
    }

    #[test]
    fn test_reconnect_with_power_off_does_not_query() {
        let known = ReceiverStatus { power: Some(false), epoch: 1, ..ReceiverStatus::default() };
        let current = ReceiverStatus { epoch: 2, ..known.clone() };

        let plan = plan_refresh(&known, &current);
        assert!(!plan.query_main);
        assert!(!plan.query_sleep);
    }

    #[test]
    fn test_zone2_power_rule() {
        let known = ReceiverStatus { zone2power: Some(false), epoch: 3, ..ReceiverStatus::default() };
        let current = ReceiverStatus { zone2power: Some(true), ..known.clone() };
        let plan = plan_refresh(&known, &current);

        assert!(plan.query_zone2);
        assert!(!plan.query_main);
        assert!(plan.query_sleep);
    }

    #[test]
    fn test_format_facet() {
        assert_eq!(format_facet(Facet::Power, &FacetValue::Bool(true)), "power: on");
        assert_eq!(format_facet(Facet::Sleep, &FacetValue::Int(0)), "sleep: off");
        assert_eq!(format_facet(Facet::Sleep, &FacetValue::Int(30)), "sleep: 30 min");
        assert_eq!(format_facet(Facet::Tune, &FacetValue::Text("101.5 FM".into())), "tune: 101.5 FM");
    }

    #[test]
    fn test_render_skips_unknown_facets() {
        assert_eq!(render_status(&ReceiverStatus::new()), "  (nothing known yet)");

        let status = ReceiverStatus { volume: Some(45), mute: Some(false), ..ReceiverStatus::default() };
        assert_eq!(render_status(&status), "  mute: off\n  volume: 45");
    }

    #[tokio::test]
    async fn test_refresh_after_power_on_queries_status_and_sleep() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (mut client, _notes) = ReceiverClient::new(ClientConfig::new("127.0.0.1", port));
        let mut frontend = Frontend::new(client.status_handle());

        let daemon = async {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            write.write_all(b"OK:onkyocontrol v1.1\n").await.unwrap();
            (BufReader::new(read).lines(), write)
        };
        let (ok, (mut lines, _write)) = tokio::join!(client.establish_connection(), daemon);
        assert!(ok);

        assert_eq!(client.set_power(true).await, Delivery::Sent);
        frontend.refresh(&mut client).await;
        assert_eq!(frontend.snapshot().power, Some(true));

        let mut received = Vec::new();
        for _ in 0..5 {
            let line = timeout(Duration::from_secs(5), lines.next_line()).await.unwrap().unwrap();
            received.push(line.unwrap());
        }
        assert_eq!(received, ["power", "z2power", "power on", "status", "sleep"]);
    }
}
