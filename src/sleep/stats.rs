//! Summary statistics over a nightly series

use serde::Serialize;

use super::night::NightlySleep;

/// Summary of a nightly sleep series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepStats {
    pub nights: usize,
    pub total_hours: f64,
    pub average_hours: f64,
    pub shortest: NightlySleep,
    pub longest: NightlySleep,
}

impl SleepStats {
    /// Compute stats, `None` for an empty series
    pub fn from_nights(nights: &[NightlySleep]) -> Option<Self> {
        let first = *nights.first()?;

        let (total_hours, shortest, longest) = nights.iter().fold(
            (0.0, first, first),
            |(total, shortest, longest), night| {
                (
                    total + night.hours,
                    if night.hours < shortest.hours { *night } else { shortest },
                    if night.hours > longest.hours { *night } else { longest },
                )
            },
        );

        Some(Self {
            nights: nights.len(),
            total_hours,
            average_hours: total_hours / nights.len() as f64,
            shortest,
            longest,
        })
    }
}
