use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::MemoryBackend;
use crate::services::{
    Metric, Overview, Period, ServiceRequestStatus, ServiceResult, StatisticsService, TrendPeriod, TrendPoint,
    TrendSeries, UserWorkload,
};

fn bucket_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// The last `months` calendar months ending with the one containing `today`, oldest first
fn month_buckets(today: NaiveDate, months: u32) -> Vec<String> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..months as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
        })
        .collect()
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

#[async_trait]
impl StatisticsService for MemoryBackend {
    async fn overview(&self, period: Period) -> ServiceResult<Overview> {
        let since = Utc::now() - period.duration();
        let tables = self.tables.read().await;

        let mut overview = Overview {
            period,
            total_requests: 0,
            open: 0,
            in_progress: 0,
            resolved: 0,
            closed: 0,
            validated: 0,
            total_hours: Decimal::ZERO,
            avg_resolution_hours: None,
        };
        let mut resolution_hours = Vec::new();

        for request in tables.service_requests.values().filter(|r| r.created_at >= since) {
            overview.total_requests += 1;
            match request.status {
                ServiceRequestStatus::Open => overview.open += 1,
                ServiceRequestStatus::InProgress => overview.in_progress += 1,
                ServiceRequestStatus::Resolved => overview.resolved += 1,
                ServiceRequestStatus::Closed => overview.closed += 1,
            }
            if request.validated_by.is_some() {
                overview.validated += 1;
            }
            if let Some(resolved_at) = request.resolved_at {
                resolution_hours.push(hours_between(request.created_at, resolved_at));
            }
        }

        if !resolution_hours.is_empty() {
            let total: f64 = resolution_hours.iter().sum();
            overview.avg_resolution_hours = Some(total / resolution_hours.len() as f64);
        }

        let since_day = since.date_naive();
        overview.total_hours = tables
            .time_entries
            .values()
            .filter(|e| e.date >= since_day)
            .map(|e| e.hours)
            .sum();

        Ok(overview)
    }

    async fn workload(&self, user_id: Option<u64>, period: Period) -> ServiceResult<Vec<UserWorkload>> {
        let since_day = (Utc::now() - period.duration()).date_naive();
        let tables = self.tables.read().await;
        let wanted = |id: u64| user_id.map_or(true, |u| u == id);

        let mut load: BTreeMap<u64, UserWorkload> = BTreeMap::new();
        let blank = |user_id| UserWorkload {
            user_id,
            assigned_open: 0,
            hours_logged: Decimal::ZERO,
            entries: 0,
        };

        if let Some(id) = user_id {
            load.insert(id, blank(id));
        }

        for request in tables.service_requests.values() {
            let active = matches!(
                request.status,
                ServiceRequestStatus::Open | ServiceRequestStatus::InProgress
            );
            match request.assignee_id {
                Some(assignee) if active && wanted(assignee) => {
                    load.entry(assignee).or_insert_with(|| blank(assignee)).assigned_open += 1;
                }
                _ => {}
            }
        }

        for entry in tables.time_entries.values() {
            if entry.date < since_day || !wanted(entry.user_id) {
                continue;
            }
            let row = load.entry(entry.user_id).or_insert_with(|| blank(entry.user_id));
            row.hours_logged += entry.hours;
            row.entries += 1;
        }

        Ok(load.into_values().collect())
    }

    async fn trends(&self, metric: Metric, period: TrendPeriod) -> ServiceResult<TrendSeries> {
        let buckets = month_buckets(Utc::now().date_naive(), period.months());
        let mut values: BTreeMap<String, Decimal> =
            buckets.iter().map(|bucket| (bucket.clone(), Decimal::ZERO)).collect();

        let tables = self.tables.read().await;
        let samples: Vec<(NaiveDate, Decimal)> = match metric {
            Metric::RequestsCreated => tables
                .service_requests
                .values()
                .map(|r| (r.created_at.date_naive(), Decimal::ONE))
                .collect(),
            Metric::RequestsResolved => tables
                .service_requests
                .values()
                .filter_map(|r| r.resolved_at.map(|at| (at.date_naive(), Decimal::ONE)))
                .collect(),
            Metric::HoursLogged => tables.time_entries.values().map(|e| (e.date, e.hours)).collect(),
        };

        for (date, value) in samples {
            // Samples outside the window have no bucket
            if let Some(total) = values.get_mut(&bucket_of(date)) {
                *total += value;
            }
        }

        let points = buckets
            .into_iter()
            .map(|bucket| {
                let value = values.get(&bucket).copied().unwrap_or_default();
                TrendPoint { bucket, value }
            })
            .collect();

        Ok(TrendSeries { metric, period, points })
    }
}
