use geo::{BoundingRect, Relate};

use crate::error::{Error, Result};
use super::{envelope, Geometries};

impl Geometries {
    /// Rook contiguity (shared edge with positive length) between all shapes.
    /// Uses DE-9IM: require `touches` AND boundary∩boundary has dimension 1.
    /// Neighbor lists are sorted ascending.
    pub fn rook_adjacency(&self) -> Result<Vec<Vec<u32>>> {
        let mut adj_list = vec![Vec::new(); self.len()];

        for i in 0..self.len() {
            let Some(rect) = self.shapes()[i].bounding_rect() else { continue };

            for j in self.query(&envelope(&rect, 0.0)) {
                if j <= i { continue; } // check each unordered pair once

                let im = self.shapes()[i].relate(&self.shapes()[j]);

                // In the 9-char DE-9IM string, index 4 is Boundary/Boundary.
                let shares_edge = im.matches("****1****")
                    .map_err(|e| Error::Geometry(format!("invalid DE-9IM pattern: {e:?}")))?;
                if im.is_touches() && shares_edge {
                    adj_list[i].push(j as u32);
                    adj_list[j].push(i as u32);
                }
            }
        }

        adj_list.iter_mut().for_each(|nbrs| nbrs.sort_unstable());
        Ok(adj_list)
    }
}
