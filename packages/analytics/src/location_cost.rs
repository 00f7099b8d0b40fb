//! Average hourly cost and charging capacity per coarse area.

use std::collections::HashMap;

use parking_stats_analytics_models::{AreaStat, LocationCostParams, MAX_AREAS};
use parking_stats_parking_models::ParkingArea;

/// Groups parking areas by their coarse area and averages cost and
/// charging capacity per group.
///
/// Groups appear in the order their first member appears in the input.
/// Unclassified parking areas (`area == None`) form a group of their own.
/// Groups whose average cost is not a finite positive number are dropped,
/// the first [`MAX_AREAS`] survivors are kept, and only then, if requested,
/// the result is stable-sorted by ascending average cost.
#[must_use]
pub fn location_cost_data(params: &LocationCostParams) -> Vec<AreaStat> {
    let mut stats: Vec<AreaStat> = group_by_area(&params.data)
        .into_iter()
        .map(|(area, members)| summarize(area, &members))
        .filter(|stat| stat.average_hourly_cost.is_finite() && stat.average_hourly_cost > 0.0)
        .take(MAX_AREAS)
        .collect();

    if params.is_sorted {
        stats.sort_by(|a, b| a.average_hourly_cost.total_cmp(&b.average_hourly_cost));
    }

    log::debug!(
        "Aggregated {} parking areas into {} area stats",
        params.data.len(),
        stats.len()
    );

    stats
}

/// Groups entities by area, preserving first-discovery order.
fn group_by_area(data: &[ParkingArea]) -> Vec<(Option<String>, Vec<&ParkingArea>)> {
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<String>, Vec<&ParkingArea>)> = Vec::new();

    for entity in data {
        let key = entity.area.as_deref();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((entity.area.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(entity);
    }

    groups
}

fn summarize(area: Option<String>, members: &[&ParkingArea]) -> AreaStat {
    let average_hourly_cost = mean(members.iter().map(|m| m.hourly_cost));
    let average_charging_points =
        round_or_zero(mean(members.iter().map(|m| m.charging_point_capacity)));

    AreaStat {
        area,
        average_hourly_cost,
        average_charging_points,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return f64::NAN;
    }
    values.sum::<f64>() / count as f64
}

#[allow(clippy::cast_possible_truncation)]
fn round_or_zero(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}
