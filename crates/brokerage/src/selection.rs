use serde::Serialize;

use crate::catalog::{ServiceCategory, ServiceId};

/// Ordered set of service lines the prospect picked on the landing page.
///
/// Selection order is questionnaire order. Nothing here is persisted; a fresh session starts
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedServices {
    services: Vec<ServiceCategory>,
}

impl SelectedServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ServiceId>,
    {
        let mut selected = Self::new();
        for id in ids {
            selected.select(id.category().clone());
        }
        selected
    }

    /// Returns `false` when the service was already selected.
    pub fn select(&mut self, service: ServiceCategory) -> bool {
        if self.is_selected(service.id) {
            return false;
        }
        self.services.push(service);
        true
    }

    /// Inserts right after `anchor`, or appends when the anchor is absent.
    pub(crate) fn insert_after(&mut self, anchor: ServiceId, service: ServiceCategory) -> bool {
        if self.is_selected(service.id) {
            return false;
        }
        match self.position(anchor) {
            Some(index) => self.services.insert(index + 1, service),
            None => self.services.push(service),
        }
        true
    }

    pub fn deselect(&mut self, id: ServiceId) -> bool {
        let before = self.services.len();
        self.services.retain(|service| service.id != id);
        before != self.services.len()
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }

    pub fn is_selected(&self, id: ServiceId) -> bool {
        self.services.iter().any(|service| service.id == id)
    }

    pub fn position(&self, id: ServiceId) -> Option<usize> {
        self.services.iter().position(|service| service.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&ServiceCategory> {
        self.services.get(index)
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        self.services.iter().map(|service| service.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceCategory> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reselecting_does_not_duplicate() {
        let mut selected = SelectedServices::new();
        assert!(selected.select(ServiceId::Mortgage.category().clone()));
        assert!(!selected.select(ServiceId::Mortgage.category().clone()));
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn membership_tracks_any_select_deselect_sequence() {
        let script = [
            (true, ServiceId::Insurance),
            (true, ServiceId::Mortgage),
            (false, ServiceId::Insurance),
            (true, ServiceId::Insurance),
            (true, ServiceId::Mortgage),
            (false, ServiceId::Construction),
            (true, ServiceId::HomeServices),
            (false, ServiceId::Mortgage),
        ];

        let mut selected = SelectedServices::new();
        let mut expected: Vec<ServiceId> = Vec::new();
        for (select, id) in script {
            if select {
                selected.select(id.category().clone());
                if !expected.contains(&id) {
                    expected.push(id);
                }
            } else {
                selected.deselect(id);
                expected.retain(|existing| *existing != id);
            }

            for candidate in ServiceId::ALL {
                assert_eq!(
                    selected.is_selected(candidate),
                    expected.contains(&candidate),
                    "membership of {candidate} diverged"
                );
            }
            assert_eq!(selected.ids(), expected);
        }
    }

    #[test]
    fn insert_after_places_service_next_to_anchor() {
        let mut selected =
            SelectedServices::from_ids([ServiceId::RealEstate, ServiceId::Insurance]);
        assert!(selected.insert_after(
            ServiceId::RealEstate,
            ServiceId::Mortgage.category().clone()
        ));
        assert_eq!(
            selected.ids(),
            vec![
                ServiceId::RealEstate,
                ServiceId::Mortgage,
                ServiceId::Insurance
            ]
        );
    }

    #[test]
    fn clear_empties_selection() {
        let mut selected = SelectedServices::from_ids(ServiceId::ALL);
        selected.clear();
        assert!(selected.is_empty());
        assert!(!selected.is_selected(ServiceId::RealEstate));
    }
}
