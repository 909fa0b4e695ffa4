use std::{collections::BTreeSet, fmt, str::FromStr};

use geo::{BoundingRect, Contains, Intersects, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{invalid, Error, Result},
    frame::{f64_values, string_values, GeoFrame, PointFrame},
    geom::{circle, ensure_same_crs, envelope, Geometries, DEFAULT_SEGMENTS},
    graph::NeighborMap,
};

/// How candidate neighborhoods are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// Every candidate intersecting a `search_distance` buffer around the
    /// candidate's representative point. Quadratic in the candidate count.
    Brute,
    /// Rook (shared-edge) neighbors, computed once. Linear after the
    /// adjacency build; approximates reachability by contiguity.
    #[default]
    Clustering,
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMethod::Brute => "brute",
            SearchMethod::Clustering => "clustering",
        })
    }
}

impl FromStr for SearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "brute" => Ok(SearchMethod::Brute),
            "clustering" => Ok(SearchMethod::Clustering),
            other => Err(invalid!("search method must be either 'brute' or 'clustering', got {other:?}")),
        }
    }
}

/// Parameters for [`optimal_single_location`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSearch {
    /// Identifier column of the candidate areas.
    pub key: String,
    /// Population (or other weight) column of the candidate areas.
    pub weight_col: String,
    /// Access radius around a facility, in CRS units.
    pub search_distance: f64,
    #[serde(default)]
    pub method: SearchMethod,
}

/// The best new site and the areas it would newly cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub optimal: String,
    /// `optimal` plus its neighbors.
    pub added: BTreeSet<String>,
    /// Sum of the weight column over `added`.
    pub total_gain: f64,
}

/// Pick the candidate area that, if given a facility, newly covers the most weight.
///
/// Candidates whose representative point is already within `search_distance`
/// of a point of interest are skipped, both as sites and as neighbors. Ties go
/// to the candidate that comes first. Returns None when everything is covered.
pub fn optimal_single_location(pois: &PointFrame, candidates: &GeoFrame, params: &SiteSearch) -> Result<Option<Coverage>> {
    let distance = params.search_distance;
    if !distance.is_finite() || distance <= 0.0 {
        return Err(invalid!("search distance must be a positive number, got {distance}"));
    }
    ensure_same_crs(pois.epsg(), candidates.epsg())?;

    let keys = string_values(candidates.data(), &params.key)?
        .into_iter()
        .enumerate()
        .map(|(i, key)| key.ok_or_else(|| invalid!("candidate {i} has a null {:?}", params.key)))
        .collect::<Result<Vec<_>>>()?;
    let weights = f64_values(candidates.data(), &params.weight_col)?
        .into_iter()
        .map(|weight| weight.unwrap_or(0.0))
        .collect::<Vec<_>>();
    let points = candidates.geoms().interior_points()?;

    // Areas already within reach of an existing facility
    let covered_area = Geometries::union_of(
        pois.points().iter().map(|&poi| circle(poi, distance, DEFAULT_SEGMENTS))
    );
    let open = points.iter()
        .map(|point| !covered_area.contains(point))
        .collect::<Vec<_>>();
    debug!("[optimal_single_location] {} of {} candidates already covered",
        open.iter().filter(|&&o| !o).count(), open.len());

    let neighbors = match params.method {
        SearchMethod::Brute => brute_neighbors(candidates.geoms(), &points, &open, distance),
        SearchMethod::Clustering => clustering_neighbors(candidates.geoms(), &open)?,
    };
    debug!("[optimal_single_location] {} neighbor map: {} links", params.method, neighbors.edge_count());

    let mut best: Option<(usize, f64)> = None;
    for i in (0..keys.len()).filter(|&i| open[i]) {
        let gain = weights[i] + neighbors.neighbors(i).map(|j| weights[j]).sum::<f64>();
        if best.is_none_or(|(_, best_gain)| gain > best_gain) {
            best = Some((i, gain));
        }
    }

    let Some((site, total_gain)) = best else { return Ok(None) };
    let added = std::iter::once(site)
        .chain(neighbors.neighbors(site))
        .map(|i| keys[i].clone())
        .collect::<BTreeSet<_>>();
    info!("[optimal_single_location] chose {:?}, covering {} areas with gain {total_gain}", keys[site], added.len());

    Ok(Some(Coverage { optimal: keys[site].clone(), added, total_gain }))
}

/// Open candidates whose shapes intersect a buffer around each open candidate's point.
fn brute_neighbors(geoms: &Geometries, points: &[Point<f64>], open: &[bool], distance: f64) -> NeighborMap {
    let lists = (0..geoms.len())
        .map(|i| {
            if !open[i] { return Vec::new() }

            let buffer = circle(points[i], distance, DEFAULT_SEGMENTS);
            let Some(rect) = buffer.bounding_rect() else { return Vec::new() };
            geoms.query(&envelope(&rect, 0.0)).into_iter()
                .filter(|&j| j != i && open[j] && buffer.intersects(&geoms.shapes()[j]))
                .map(|j| j as u32)
                .collect()
        })
        .collect::<Vec<_>>();

    NeighborMap::new(&lists)
}

/// Open rook neighbors of each open candidate.
fn clustering_neighbors(geoms: &Geometries, open: &[bool]) -> Result<NeighborMap> {
    let mut lists = geoms.rook_adjacency()?;
    for (i, nbrs) in lists.iter_mut().enumerate() {
        if open[i] {
            nbrs.retain(|&j| open[j as usize]);
        } else {
            nbrs.clear();
        }
    }

    Ok(NeighborMap::new(&lists))
}
