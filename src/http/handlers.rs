//! The four endpoints served over both HTTP and HTTPS.
//!
//! Every handler attaches the session cookie before writing a body. The data
//! endpoints (`/`, `/slow`) bracket their whole execution with scoreboard
//! accounting; the observation endpoints (`/stats`, `/reset`) deliberately
//! do not, so reading the counters never perturbs them.

use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::http::server::AppState;

/// Substituted when the `delay` parameter is missing or unparseable.
const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// `/`: canned response, bracketed by scoreboard accounting.
pub async fn echo(State(state): State<AppState>) -> Response {
    let _in_flight = state.scoreboard.track();
    with_cookie(&state, state.identity.body().to_owned())
}

/// `/slow`: like `/` but sleeps first, simulating a slow backend so
/// harnesses can observe load-balancer timeout and retry behavior.
///
/// The accounting bracket spans the sleep; a held-open slow request shows up
/// in the concurrency stats for its full duration. The query string is
/// inspected leniently so a malformed one can never produce an error
/// response, only the default delay.
pub async fn slow(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let _in_flight = state.scoreboard.track();
    let delay = query
        .as_deref()
        .and_then(first_delay_param)
        .and_then(parse_delay)
        .unwrap_or(DEFAULT_DELAY);
    tokio::time::sleep(delay).await;
    with_cookie(&state, state.identity.body().to_owned())
}

/// `/stats`: reads the scoreboard without opening a slot for itself.
pub async fn stats(State(state): State<AppState>) -> Response {
    let (peak, total) = state.scoreboard.stats();
    with_cookie(&state, format!("maxConn={peak}\ntotalConn={total}\n"))
}

/// `/reset`: zeroes peak and total without opening a slot for itself.
pub async fn reset(State(state): State<AppState>) -> Response {
    state.scoreboard.reset();
    with_cookie(&state, "reset\n".to_owned())
}

/// Pull the first `delay` value out of a raw query string.
fn first_delay_param(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "delay").then_some(value)
    })
}

fn with_cookie(state: &AppState, body: String) -> Response {
    ([(header::SET_COOKIE, state.identity.cookie())], body).into_response()
}

/// Parse a duration string of the form `500ms`, `3s`, or compound `1m30s`.
///
/// A bare number without a unit is rejected. Returns `None` on any parse
/// failure; callers substitute the 3-second default rather than surfacing
/// an error to the caller.
fn parse_delay(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }
    let mut secs = 0.0f64;
    while !rest.is_empty() {
        let value_end = rest.find(|c: char| !c.is_ascii_digit() && c != '.')?;
        if value_end == 0 {
            return None;
        }
        let (value, tail) = rest.split_at(value_end);
        let value: f64 = value.parse().ok()?;
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let unit_secs = match unit {
            "ns" => 1e-9,
            "us" | "\u{b5}s" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        secs += value * unit_secs;
        rest = tail;
    }
    // Rejects NaN, negatives, and absurdly large values in one place.
    Duration::try_from_secs_f64(secs).ok()
}
