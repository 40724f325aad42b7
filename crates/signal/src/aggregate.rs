use std::collections::BTreeMap;

use crate::centroid::weighted_centroid;
use crate::observation::{Estimate, Observation};

/// Groups observations by `network_id`.
///
/// Every group has at least one member. Keys iterate in byte order so the
/// result is deterministic regardless of input order.
pub fn group_by_network(observations: &[Observation]) -> BTreeMap<&str, Vec<&Observation>> {
    let mut groups: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for o in observations {
        groups.entry(o.network_id.as_str()).or_default().push(o);
    }
    groups
}

/// Computes one [`Estimate`] per distinct network, each from that network's
/// observations only.
pub fn group_and_estimate(observations: &[Observation]) -> BTreeMap<String, Estimate> {
    group_by_network(observations)
        .into_iter()
        .map(|(network_id, members)| {
            let p = weighted_centroid(&members);
            let estimate = Estimate {
                network_id: network_id.to_string(),
                latitude: p.latitude,
                longitude: p.longitude,
                observation_count: members.len(),
            };
            (network_id.to_string(), estimate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_and_estimate, group_by_network};
    use crate::centroid::weighted_centroid;
    use crate::observation::Observation;
    use foundation::{LatLng, Timestamp};
    use pretty_assertions::assert_eq;

    fn obs(id: &str, lat: f64, lng: f64, dbm: i32) -> Observation {
        Observation::new(LatLng::new(lat, lng), dbm, id, Timestamp(0))
    }

    #[test]
    fn one_estimate_per_network_without_cross_contamination() {
        let input = vec![
            obs("a", 0.0, 0.0, -50),
            obs("b", 50.0, 50.0, -30),
            obs("a", 0.0, 2.0, -50),
            obs("c", -10.0, 5.0, -70),
            obs("b", 52.0, 50.0, -30),
        ];
        let out = group_and_estimate(&input);
        assert_eq!(out.keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let a = &out["a"];
        assert!((a.latitude - 0.0).abs() < 1e-9);
        assert!((a.longitude - 1.0).abs() < 1e-9);
        assert_eq!(a.observation_count, 2);

        let b = &out["b"];
        assert!((b.latitude - 51.0).abs() < 1e-9);
        assert_eq!(b.observation_count, 2);

        let c = &out["c"];
        assert_eq!(c.position(), LatLng::new(-10.0, 5.0));
        assert_eq!(c.observation_count, 1);
    }

    #[test]
    fn matches_estimator_per_group() {
        let input = vec![
            obs("x", 1.0, 1.0, -40),
            obs("y", 9.0, 9.0, -90),
            obs("x", 3.0, 2.0, -60),
        ];
        let groups = group_by_network(&input);
        let out = group_and_estimate(&input);
        for (id, members) in groups {
            assert_eq!(out[id].position(), weighted_centroid(&members));
        }
    }

    #[test]
    fn input_order_does_not_change_result() {
        let mut input = vec![
            obs("x", 1.0, 1.0, -40),
            obs("y", 9.0, 9.0, -90),
            obs("x", 3.0, 2.0, -60),
        ];
        let forward = group_and_estimate(&input);
        input.reverse();
        let backward = group_and_estimate(&input);
        assert_eq!(forward.len(), backward.len());
        for (id, e) in &forward {
            assert!((e.latitude - backward[id].latitude).abs() < 1e-12);
            assert!((e.longitude - backward[id].longitude).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(group_and_estimate(&[]).is_empty());
    }
}
