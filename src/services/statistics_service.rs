use std::str::FromStr;

use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ServiceResult;

/// Window for aggregate statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    pub fn duration(self) -> Duration {
        match self {
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
            Period::Quarter => Duration::days(90),
            Period::Year => Duration::days(365),
        }
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            _ => Err(()),
        }
    }
}

/// Window for trend series, bucketed by calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendPeriod {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
}

impl TrendPeriod {
    pub fn months(self) -> u32 {
        match self {
            TrendPeriod::OneMonth => 1,
            TrendPeriod::ThreeMonths => 3,
            TrendPeriod::SixMonths => 6,
            TrendPeriod::Year => 12,
        }
    }
}

impl FromStr for TrendPeriod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1month" => Ok(TrendPeriod::OneMonth),
            "3months" => Ok(TrendPeriod::ThreeMonths),
            "6months" => Ok(TrendPeriod::SixMonths),
            "year" => Ok(TrendPeriod::Year),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RequestsCreated,
    RequestsResolved,
    HoursLogged,
}

impl FromStr for Metric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requests_created" => Ok(Metric::RequestsCreated),
            "requests_resolved" => Ok(Metric::RequestsResolved),
            "hours_logged" => Ok(Metric::HoursLogged),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub period: Period,
    pub total_requests: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
    pub validated: u64,
    pub total_hours: Decimal,
    /// Mean creation-to-resolution time of requests resolved in the window
    pub avg_resolution_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWorkload {
    pub user_id: u64,
    pub assigned_open: u64,
    pub hours_logged: Decimal,
    pub entries: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub bucket: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub metric: Metric,
    pub period: TrendPeriod,
    pub points: Vec<TrendPoint>,
}

/// Read-only aggregations over requests and time entries
#[async_trait]
pub trait StatisticsService: Send + Sync {
    async fn overview(&self, period: Period) -> ServiceResult<Overview>;
    /// Per-agent load; `user_id` narrows to one agent
    async fn workload(&self, user_id: Option<u64>, period: Period) -> ServiceResult<Vec<UserWorkload>>;
    async fn trends(&self, metric: Metric, period: TrendPeriod) -> ServiceResult<TrendSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_parse_from_query_values() {
        assert_eq!("quarter".parse::<Period>(), Ok(Period::Quarter));
        assert_eq!("3months".parse::<TrendPeriod>(), Ok(TrendPeriod::ThreeMonths));
        assert!("fortnight".parse::<Period>().is_err());
        assert!("month".parse::<TrendPeriod>().is_err());
    }

    #[test]
    fn trend_period_serializes_as_query_value() {
        assert_eq!(serde_json::to_value(TrendPeriod::SixMonths).unwrap(), "6months");
        assert_eq!(serde_json::to_value(Period::default()).unwrap(), "month");
    }
}
