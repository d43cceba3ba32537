//! Time-windowed sub-views.

use chrono::DateTime;
use chrono_tz::Tz;
use shard_config::BrandMechanics;
use shard_geo::wave_bounds;
use shard_schemas::{TargetEntry, View, WaveWindow};
use shard_scoring::RuleTable;

use crate::reconstruct::{attach_targets, reconstruct, ObjectRecord, ViewContext};
use crate::{PortalRegistry, QualityWarning};

/// One wave window in minutes from the anchor; `end_offset` inclusive of
/// its minute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveSlot {
    pub start_offset: i64,
    pub end_offset: i64,
    pub expected_quantity: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    pub anchor: DateTime<Tz>,
    pub slots: Vec<WaveSlot>,
}

impl WavePlan {
    /// Plan for one site. Mechanics with a single wave produce no wave
    /// views; the full event already covers it.
    pub fn for_site(
        mechanics: &BrandMechanics,
        site_name: &str,
        anchor: DateTime<Tz>,
    ) -> Option<Self> {
        if mechanics.waves.len() <= 1 {
            return None;
        }
        let slots = mechanics
            .waves
            .iter()
            .enumerate()
            .map(|(i, w)| WaveSlot {
                start_offset: w.start_offset,
                end_offset: w.end_offset,
                expected_quantity: mechanics.expected_quantity(i, site_name),
            })
            .collect();
        Some(Self { anchor, slots })
    }
}

/// One independent view per slot, over the objects spawned inside
/// `[anchor + start, anchor + end + 1min)`. Targets, when present, are
/// filtered to the same window by observation time. A slot whose bounds
/// cannot be placed on the timeline is skipped with a warning.
pub fn partition(
    objects: &[ObjectRecord],
    targets: Option<&[TargetEntry]>,
    registry: &PortalRegistry,
    rules: &RuleTable,
    plan: &WavePlan,
    ctx: &mut ViewContext<'_>,
) -> Vec<View> {
    let mut views = Vec::with_capacity(plan.slots.len());
    for (index, slot) in plan.slots.iter().enumerate() {
        let Some(bounds) = wave_bounds(&plan.anchor, slot.start_offset, slot.end_offset) else {
            ctx.warnings.push(QualityWarning::WaveOutOfRange {
                site: ctx.site.to_string(),
                wave: index,
                start_offset: slot.start_offset,
                end_offset: slot.end_offset,
            });
            continue;
        };
        let in_wave = objects
            .iter()
            .filter(|o| o.spawn_time_ms().is_some_and(|t| bounds.contains(t)));

        let mut view = reconstruct(in_wave, registry, rules, &mut ctx.wave());
        view.window = Some(WaveWindow {
            index,
            start_ms: bounds.start_ms,
            end_ms: bounds.end_ms,
        });
        view.expected_quantity = slot.expected_quantity;
        if let Some(all) = targets {
            let within = all
                .iter()
                .filter(|t| bounds.contains(t.observed_at))
                .cloned()
                .collect();
            attach_targets(&mut view, within);
        }
        views.push(view);
    }
    views
}
