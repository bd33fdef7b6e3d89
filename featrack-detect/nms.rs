use featrack_core::Keypoint;

/// Greedy distance-based non-maximum suppression: strongest responses win,
/// anything within `min_distance` of an accepted keypoint is dropped.
pub(crate) fn suppress(mut keypoints: Vec<Keypoint>, min_distance: f32) -> Vec<Keypoint> {
    if keypoints.is_empty() {
        return keypoints;
    }

    keypoints.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let min_distance_sq = min_distance * min_distance;
    let mut accepted: Vec<Keypoint> = Vec::new();

    for candidate in keypoints {
        let crowded = accepted.iter().any(|kept| {
            let dx = candidate.x - kept.x;
            let dy = candidate.y - kept.y;
            dx * dx + dy * dy < min_distance_sq
        });
        if !crowded {
            accepted.push(candidate);
        }
    }

    accepted
}
