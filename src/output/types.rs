use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "recap.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Meta {
    /// Wall time since `started`, tagged with a fresh run id.
    pub fn since(started: Instant) -> Self {
        Meta {
            duration_ms: Some(started.elapsed().as_millis()),
            run_id: Some(Uuid::new_v4().to_string()),
        }
    }
}

/// A dry run carries a `plan`; an executed command carries a `result`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Plan(Value),
    Result(Value),
}

/// The single JSON document a command writes to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(flatten)]
    pub body: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    fn wrap(op: &'static str, body: Body, meta: Option<Meta>) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply: matches!(body, Body::Result(_)),
            body,
            meta,
        }
    }

    pub fn plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        Ok(Self::wrap(op, Body::Plan(serde_json::to_value(plan)?), meta))
    }

    pub fn result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        Ok(Self::wrap(op, Body::Result(serde_json::to_value(result)?), meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_envelope_is_not_applied() {
        let env = Envelope::plan("summarize", &json!({"input_chars": 30000, "chunks": 2}), None).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["schema_version"], SCHEMA_VERSION);
        assert_eq!(v["op"], "summarize");
        assert_eq!(v["apply"], false);
        assert_eq!(v["plan"]["chunks"], 2);
        assert!(v.get("result").is_none());
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn result_envelope_is_applied() {
        let env = Envelope::result("ask", &json!({"answer": "Week 3 covers recursion."}), None).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["apply"], true);
        assert_eq!(v["result"]["answer"], "Week 3 covers recursion.");
        assert!(v.get("plan").is_none());
    }

    #[test]
    fn meta_since_records_duration_and_run_id() {
        let meta = Meta::since(Instant::now());
        assert!(meta.duration_ms.is_some());
        assert!(Uuid::parse_str(meta.run_id.as_deref().unwrap()).is_ok());
        assert_eq!(serde_json::to_value(Meta::default()).unwrap(), json!({}));
    }
}
