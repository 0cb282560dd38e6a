//! Statistical mapping from observed font sizes to abstract hierarchy levels.
//!
//! Sizes are grouped into heading bands derived from percentiles of the
//! document's own size distribution. Bands are applied from the largest lower
//! bound down; the first applied band becomes level 1, the next level 2, and so
//! on. Any size not covered by a band is body text (level 5).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use outline_model::TextSpan;

use crate::stats::percentile_sorted;

/// Level assigned to body text and to sizes the map has never seen.
pub const BODY_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy)]
struct SizeKey(f32);

impl PartialEq for SizeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for SizeKey {}
impl PartialOrd for SizeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for SizeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Read-only mapping fontSize -> hierarchy level (1..=5).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontLevelMap {
    levels: BTreeMap<SizeKey, u8>,
}

impl FontLevelMap {
    /// Level for `size`; unseen sizes are body text.
    pub fn level_of(&self, size: f32) -> u8 {
        self.levels.get(&SizeKey(size)).copied().unwrap_or(BODY_LEVEL)
    }

    pub fn contains(&self, size: f32) -> bool {
        self.levels.contains_key(&SizeKey(size))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// (size, level) pairs in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (f32, u8)> + '_ {
        self.levels.iter().map(|(k, v)| (k.0, *v))
    }

    fn set(&mut self, size: f32, level: u8) {
        self.levels.insert(SizeKey(size), level);
    }
}

/// Percentiles of a document's font-size population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStatistics {
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl SizeStatistics {
    pub fn from_sizes(sizes: &[f32]) -> Option<Self> {
        if sizes.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = sizes.iter().map(|s| *s as f64).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            q25: percentile_sorted(&sorted, 25.0),
            median: percentile_sorted(&sorted, 50.0),
            q75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
        })
    }
}

/// Half-open size range `[min, max)` proposed as a heading band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontBand {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FontBand {
    pub fn contains(&self, size: f64) -> bool {
        self.min <= size && size < self.max
    }
}

/// Candidate bands whose gap condition holds, in H1..H4 proposal order.
pub fn heading_bands(stats: &SizeStatistics) -> Vec<FontBand> {
    let mut bands = Vec::with_capacity(4);
    let h1_holds = stats.p95 > stats.median + 2.0;
    if h1_holds {
        bands.push(FontBand { label: "H1", min: stats.p95, max: f64::INFINITY });
    }
    if stats.p90 > stats.median + 1.0 {
        let max = if h1_holds { stats.p95 } else { f64::INFINITY };
        bands.push(FontBand { label: "H2", min: stats.p90, max });
    }
    if stats.q75 > stats.median {
        bands.push(FontBand { label: "H3", min: stats.q75, max: stats.p90 });
    }
    if stats.median < stats.q75 {
        bands.push(FontBand { label: "H4", min: stats.median + 0.5, max: stats.q75 });
    }
    bands
}

/// Build the font level map for one document from its full span population.
pub fn analyze_font_hierarchy<'a, I>(spans: I) -> FontLevelMap
where
    I: IntoIterator<Item = &'a TextSpan>,
{
    let sizes: Vec<f32> = spans.into_iter().map(|s| s.font_size).collect();
    font_levels_from_sizes(&sizes)
}

pub fn font_levels_from_sizes(sizes: &[f32]) -> FontLevelMap {
    let mut map = FontLevelMap::default();

    let mut distinct: Vec<f32> = Vec::new();
    for s in sizes {
        if !distinct.iter().any(|d| d.total_cmp(s) == Ordering::Equal) {
            distinct.push(*s);
        }
    }

    match distinct.len() {
        0 => return map,
        1 => {
            map.set(distinct[0], 1);
            return map;
        }
        _ => {}
    }

    let stats = match SizeStatistics::from_sizes(sizes) {
        Some(s) => s,
        None => return map,
    };

    for size in &distinct {
        map.set(*size, BODY_LEVEL);
    }

    let mut bands = heading_bands(&stats);
    // Stable: bands with equal lower bounds keep proposal order.
    bands.sort_by(|a, b| b.min.total_cmp(&a.min));

    // Overlapping bands resolve as "last band applied wins".
    for (idx, band) in bands.iter().enumerate() {
        let level = (idx + 1) as u8;
        for size in &distinct {
            if band.contains(*size as f64) {
                map.set(*size, level);
            }
        }
    }

    tracing::debug!(
        distinct = distinct.len(),
        bands = bands.len(),
        median = stats.median,
        p95 = stats.p95,
        "font hierarchy computed"
    );
    map
}
