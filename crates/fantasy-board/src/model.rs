// Records served by the fantasy service, and the row mapper for each panel.
//
// The service serializes database rows directly, so records may carry extra
// columns (ignored here) and SQL NULLs (rendered blank).

use std::fmt;

use serde::de::{self, DeserializeOwned, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};

use crate::protocol::{PanelEvent, PanelId, PanelResult};

// ---------------------------------------------------------------------------
// Record trait
// ---------------------------------------------------------------------------

/// A flat JSON record that one panel fetches and renders.
///
/// Implementors supply the panel they belong to and the mapping from one
/// record to its display cells. Everything else about loading and rendering
/// is shared.
pub trait Record: DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The panel this record type populates.
    const PANEL: PanelId;

    /// Display cells, one per entry of `PANEL.headers()`.
    fn cells(&self) -> Vec<String>;

    /// Single-line form used for list layouts and logs.
    fn list_item(&self) -> String {
        self.cells().join(" | ")
    }

    /// Wrap a loader outcome in the event variant for this panel.
    fn into_event(result: PanelResult<Self>) -> PanelEvent;
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerRecommendation {
    #[serde(default, deserialize_with = "nullable_string")]
    pub player_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub team: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub position: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Record for PlayerRecommendation {
    const PANEL: PanelId = PanelId::Recommendations;

    fn cells(&self) -> Vec<String> {
        vec![
            self.player_name.clone(),
            self.team.clone(),
            self.position.clone(),
            format_score(self.score),
        ]
    }

    fn into_event(result: PanelResult<Self>) -> PanelEvent {
        PanelEvent::Recommendations(result)
    }
}

/// Team identifier. The service emits integers, but integral floats and any
/// JSON string are accepted too. Strings are shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamId::Numeric(n) => write!(f, "{n}"),
            TeamId::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TeamIdVisitor;

        impl<'de> Visitor<'de> for TeamIdVisitor {
            type Value = TeamId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or string team id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TeamId, E> {
                Ok(TeamId::Numeric(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TeamId, E> {
                IntegerVisitor.visit_u64(v).map(TeamId::Numeric)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<TeamId, E> {
                IntegerVisitor.visit_f64(v).map(TeamId::Numeric)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TeamId, E> {
                Ok(TeamId::Text(v.to_owned()))
            }
        }

        deserializer.deserialize_any(TeamIdVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "nullable_string")]
    pub team_name: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub team_code: String,
}

impl Record for Team {
    const PANEL: PanelId = PanelId::Teams;

    fn cells(&self) -> Vec<String> {
        vec![
            self.team_name.clone(),
            format_optional(self.team_id.as_ref()),
            self.team_code.clone(),
        ]
    }

    fn list_item(&self) -> String {
        format!(
            "{} (ID: {}) - Code: {}",
            self.team_name,
            format_optional(self.team_id.as_ref()),
            self.team_code
        )
    }

    fn into_event(result: PanelResult<Self>) -> PanelEvent {
        PanelEvent::Teams(result)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveScore {
    #[serde(default, deserialize_with = "nullable_string")]
    pub home_team: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub away_team: String,
    #[serde(default, deserialize_with = "nullable_integer")]
    pub home_score: Option<i64>,
    #[serde(default, deserialize_with = "nullable_integer")]
    pub away_score: Option<i64>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub game_status: String,
}

impl Record for LiveScore {
    const PANEL: PanelId = PanelId::LiveScores;

    fn cells(&self) -> Vec<String> {
        vec![
            self.home_team.clone(),
            self.away_team.clone(),
            format_optional(self.home_score.as_ref()),
            format_optional(self.away_score.as_ref()),
            self.game_status.clone(),
        ]
    }

    fn into_event(result: PanelResult<Self>) -> PanelEvent {
        PanelEvent::LiveScores(result)
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a fantasy score to two decimal places, or blank when absent.
///
/// Exact ties round away from zero (`0.125` -> `"0.13"`), and a value that
/// rounds to zero never carries a minus sign.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => fixed_two_decimals(s),
        _ => String::new(),
    }
}

fn fixed_two_decimals(value: f64) -> String {
    // 1074 fractional digits is the exact decimal expansion of any f64.
    let exact = format!("{:.1074}", value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes().take(2)).collect();
    while digits.len() < whole.len() + 2 {
        digits.push(b'0');
    }

    if fraction.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let negative = value < 0.0 && digits.iter().any(|d| *d != b'0');
    let split = digits.len() - 2;
    let whole: String = digits[..split].iter().map(|d| char::from(*d)).collect();
    let cents: String = digits[split..].iter().map(|d| char::from(*d)).collect();
    format!("{}{whole}.{cents}", if negative { "-" } else { "" })
}

/// Render an optional value as its literal text, or blank when absent.
pub fn format_optional<T: fmt::Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Accepts a JSON integer, or a float with no fractional part.
struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(v as i64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

struct Integer(i64);

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntegerVisitor).map(Integer)
    }
}

/// Integer field that may be `null`, missing, or an integral float.
fn nullable_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Integer>::deserialize(deserializer)?.map(|Integer(v)| v))
}

/// Treat JSON `null` the same as a missing string field.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
