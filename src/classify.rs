//! classify.rs — Compara o estado atual com o baseline do dia

use crate::types::{Classification, Outage, OutageSet};

/// Separa as quedas em novas, encerradas e existentes.
///
/// Só a presença do id importa; mudanças no polígono entre o baseline e agora
/// não mudam a categoria. Em `existing` vai o polígono atual.
/// Cada lista sai ordenada por id, então entradas iguais geram saídas iguais.
pub fn classify(current: &OutageSet, baseline: &OutageSet) -> Classification {
    let mut result = Classification::default();

    for (id, coords) in current {
        let outage = Outage {
            id: id.clone(),
            coords: coords.clone(),
        };
        if baseline.contains_key(id) {
            result.existing.push(outage);
        } else {
            result.added.push(outage);
        }
    }

    for (id, coords) in baseline {
        if !current.contains_key(id) {
            result.ended.push(Outage {
                id: id.clone(),
                coords: coords.clone(),
            });
        }
    }

    for list in [&mut result.added, &mut result.ended, &mut result.existing] {
        list.sort_by(|a, b| a.id.cmp(&b.id));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, PointId, Polygon};
    use std::collections::HashSet;

    fn poly(lat: f64) -> Polygon {
        vec![Coord { lat, lng: -122.0 }, Coord { lat: lat + 0.01, lng: -122.01 }]
    }

    fn set(entries: &[(&str, f64)]) -> OutageSet {
        entries
            .iter()
            .map(|(id, lat)| (PointId::new(*id), poly(*lat)))
            .collect()
    }

    fn ids(list: &[Outage]) -> Vec<&str> {
        list.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn new_outage_is_added() {
        let baseline = set(&[("A", 47.1)]);
        let current = set(&[("A", 47.1), ("B", 47.2)]);

        let c = classify(&current, &baseline);
        assert_eq!(
            c.added,
            vec![Outage { id: PointId::new("B"), coords: poly(47.2) }]
        );
        assert!(c.ended.is_empty());
        assert_eq!(
            c.existing,
            vec![Outage { id: PointId::new("A"), coords: poly(47.1) }]
        );
    }

    #[test]
    fn missing_outage_is_ended() {
        let baseline = set(&[("A", 47.1), ("B", 47.2)]);
        let current = set(&[("A", 47.1)]);

        let c = classify(&current, &baseline);
        assert!(c.added.is_empty());
        assert_eq!(
            c.ended,
            vec![Outage { id: PointId::new("B"), coords: poly(47.2) }]
        );
        assert_eq!(ids(&c.existing), vec!["A"]);
    }

    #[test]
    fn empty_baseline_reports_everything_as_added() {
        let current = set(&[("A", 47.1), ("B", 47.2), ("C", 47.3)]);
        let c = classify(&current, &OutageSet::new());
        assert_eq!(ids(&c.added), vec!["A", "B", "C"]);
        assert!(c.ended.is_empty());
        assert!(c.existing.is_empty());
    }

    #[test]
    fn empty_current_reports_whole_baseline_as_ended() {
        let baseline = set(&[("A", 47.1), ("B", 47.2)]);
        let c = classify(&OutageSet::new(), &baseline);
        assert!(c.added.is_empty());
        assert_eq!(ids(&c.ended), vec!["A", "B"]);
        assert!(c.existing.is_empty());
    }

    #[test]
    fn existing_uses_current_polygon_even_if_shape_changed() {
        let baseline = set(&[("A", 47.1)]);
        let current = set(&[("A", 48.0)]);
        let c = classify(&current, &baseline);
        assert!(c.added.is_empty() && c.ended.is_empty());
        assert_eq!(c.existing[0].coords, poly(48.0));
    }

    #[test]
    fn empty_polygon_is_kept_as_is() {
        let mut current = OutageSet::new();
        current.insert(PointId::new("X"), Vec::new());
        let c = classify(&current, &OutageSet::new());
        assert_eq!(c.added, vec![Outage { id: PointId::new("X"), coords: vec![] }]);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_both_sets() {
        let baseline = set(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)]);
        let current = set(&[("C", 3.5), ("D", 4.0), ("E", 5.0), ("F", 6.0)]);
        let c = classify(&current, &baseline);

        let added: HashSet<_> = ids(&c.added).into_iter().collect();
        let ended: HashSet<_> = ids(&c.ended).into_iter().collect();
        let existing: HashSet<_> = ids(&c.existing).into_iter().collect();

        assert!(added.is_disjoint(&ended));
        assert!(added.is_disjoint(&existing));
        assert!(ended.is_disjoint(&existing));
        for id in current.keys() {
            assert!(added.contains(id.as_str()) ^ existing.contains(id.as_str()));
        }
        for id in baseline.keys().filter(|id| !current.contains_key(*id)) {
            assert!(ended.contains(id.as_str()));
        }
        assert_eq!(added.len() + existing.len(), current.len());
    }

    #[test]
    fn same_input_gives_same_output() {
        let baseline = set(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let current = set(&[("B", 2.0), ("C", 3.0), ("D", 4.0), ("E", 5.0)]);
        let rebuilt: OutageSet = current.clone().into_iter().collect();
        assert_eq!(classify(&current, &baseline), classify(&current, &baseline));
        assert_eq!(classify(&current, &baseline), classify(&rebuilt, &baseline));
    }
}
