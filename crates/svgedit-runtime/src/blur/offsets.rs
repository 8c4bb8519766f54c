#![forbid(unsafe_code)]

//! Filter region sizing.
//!
//! A blurred shape spreads beyond its bounding box, and the engine's default
//! filter region (10% padding) clips large deviations. Above a threshold the
//! region is widened to a fixed oversized box; below it the explicit region
//! is dropped so the engine default applies.
//!
//! The decision is a pure function of the deviation, the stale filter cache
//! quirk, and the [`BlurPolicy`]: engines with the quirk hide unrelated
//! content when the region attributes are removed, so there they are left
//! as they are.

use svgedit_core::{Document, DocumentError, NodeId};

/// Deviation above which the region is expanded.
pub const DEFAULT_EXPAND_THRESHOLD: f64 = 3.0;
/// Offset of the expanded region, in percent of the bounding box.
pub const DEFAULT_REGION_OFFSET_PCT: f64 = -50.0;
/// Size of the expanded region, in percent of the bounding box.
pub const DEFAULT_REGION_SIZE_PCT: f64 = 200.0;

/// Region attributes on a `<filter>`.
pub const REGION_ATTRS: [&str; 4] = ["x", "y", "width", "height"];

/// Tunable blur geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurPolicy {
    /// Deviations strictly above this expand the region.
    pub expand_threshold: f64,
    /// `x` and `y` of the expanded region, in percent.
    pub region_offset_pct: f64,
    /// `width` and `height` of the expanded region, in percent.
    pub region_size_pct: f64,
}

impl Default for BlurPolicy {
    fn default() -> Self {
        Self {
            expand_threshold: DEFAULT_EXPAND_THRESHOLD,
            region_offset_pct: DEFAULT_REGION_OFFSET_PCT,
            region_size_pct: DEFAULT_REGION_SIZE_PCT,
        }
    }
}

impl BlurPolicy {
    /// Attribute values of the expanded region, in [`REGION_ATTRS`] order.
    #[must_use]
    pub fn expanded_region(&self) -> [(&'static str, String); 4] {
        let offset = format!("{}%", self.region_offset_pct);
        let size = format!("{}%", self.region_size_pct);
        [
            (REGION_ATTRS[0], offset.clone()),
            (REGION_ATTRS[1], offset),
            (REGION_ATTRS[2], size.clone()),
            (REGION_ATTRS[3], size),
        ]
    }
}

/// What to do with a filter's region attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAction {
    /// Write the policy's expanded region.
    Expand,
    /// Remove the region attributes.
    Clear,
    /// Leave the region attributes untouched.
    Keep,
}

impl RegionAction {
    /// Decide the region action for a deviation.
    #[must_use]
    pub fn for_deviation(std_deviation: f64, stale_filter_cache: bool, policy: &BlurPolicy) -> Self {
        if std_deviation > policy.expand_threshold {
            Self::Expand
        } else if stale_filter_cache {
            Self::Keep
        } else {
            Self::Clear
        }
    }
}

/// Apply the region action for `std_deviation` to `filter`.
pub fn apply_region(
    doc: &mut Document,
    filter: NodeId,
    std_deviation: f64,
    stale_filter_cache: bool,
    policy: &BlurPolicy,
) -> Result<RegionAction, DocumentError> {
    let action = RegionAction::for_deviation(std_deviation, stale_filter_cache, policy);
    match action {
        RegionAction::Expand => {
            for (name, value) in policy.expanded_region() {
                doc.set_attribute(filter, name, value)?;
            }
        }
        RegionAction::Clear => {
            for name in REGION_ATTRS {
                doc.remove_attribute(filter, name)?;
            }
        }
        RegionAction::Keep => {}
    }
    Ok(action)
}
