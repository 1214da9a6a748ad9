//! Progress reporting for exports.
//!
//! An export reports once per sub-mesh, right after that sub-mesh's block has been
//! written to the output. Reports therefore arrive in sub-mesh id order, with
//! `current` counting the blocks written so far, even when welding runs in parallel.
//! A sub-mesh that fails to weld or to write is never reported, so the last
//! `current` seen before an error is the number of complete blocks in the output.
//!
//! Callers that do not care pass [`Progress::none`].
//!
//! # Example
//!
//! ```
//! use gtmesh::mesh::WeldStats;
//! use gtmesh::weld::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! let stats = WeldStats { corners: 6, vertices: 4, triangles: 2 };
//! progress.report_sub_mesh(0, 3, &stats);
//! ```

use crate::mesh::WeldStats;

/// A progress callback that receives updates during an export.
///
/// The callback receives:
/// - `current`: number of completed steps
/// - `total`: total number of steps
/// - `message`: description of the step just finished
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report that sub-mesh `id` has been written, out of `total` sub-meshes.
    ///
    /// Calls the callback with `current = id + 1` and a message naming the sub-mesh
    /// and its welded sizes.
    pub fn report_sub_mesh(&self, id: u32, total: usize, stats: &WeldStats) {
        let message = format!(
            "sub-mesh {}: {} vertices, {} triangles",
            id, stats.vertices, stats.triangles
        );
        self.report(id as usize + 1, total, &message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_receives_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, message| {
            sink.lock().unwrap().push((current, total, message.to_string()));
        });

        progress.report(1, 2, "a");
        progress.report(2, 2, "b");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (2, 2, "b".to_string()));
    }

    #[test]
    fn test_sub_mesh_report() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, message| {
            sink.lock().unwrap().push((current, total, message.to_string()));
        });

        let stats = WeldStats { corners: 6, vertices: 4, triangles: 2 };
        progress.report_sub_mesh(2, 5, &stats);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], (3, 5, "sub-mesh 2: 4 vertices, 2 triangles".to_string()));
    }

    #[test]
    fn test_none_is_silent() {
        Progress::none().report(0, 0, "ignored");
        assert_eq!(format!("{:?}", Progress::default()), "Progress { .. }");
    }
}
