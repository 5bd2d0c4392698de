use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - the logical entity an operation concerns (a symbol or a
/// portfolio configuration id). Supersession is keyed on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Subject(String);

impl Subject {
    pub fn new(subject: String) -> Result<Self, String> {
        let trimmed = subject.trim();
        if trimmed.is_empty() {
            return Err("Subject cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}


/// Value Object - chart granularity for projection and label formatting
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Interval {
    #[strum(serialize = "daily")]
    #[serde(rename = "daily")]
    Daily,

    #[strum(serialize = "weekly")]
    #[serde(rename = "weekly")]
    Weekly,

    #[strum(serialize = "monthly")]
    #[serde(rename = "monthly")]
    Monthly,
}

impl Default for Interval {
    fn default() -> Self {
        Self::Daily
    }
}

/// Value Object - which dashboard domain an operation belongs to. Each domain
/// owns one shared state record, one marker slot, and one cache namespace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, Serialize, Deserialize,
)]
pub enum AnalysisDomain {
    #[strum(serialize = "stock-analysis")]
    #[serde(rename = "stock-analysis")]
    Stock,

    #[strum(serialize = "portfolio-analysis")]
    #[serde(rename = "portfolio-analysis")]
    Portfolio,
}

impl AnalysisDomain {
    pub fn key(&self) -> &str {
        self.as_ref()
    }

    /// Remote endpoint path for this domain's analysis computation.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Stock => "analysis/stock",
            Self::Portfolio => "analysis/portfolio",
        }
    }
}

/// Value Object - opaque unique token identifying one in-flight operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "op-{}", _0)]
pub struct OperationId(u64);

impl OperationId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}
