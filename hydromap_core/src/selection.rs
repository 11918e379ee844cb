use crate::category::EntityRef;

/// A single-value register: empty, or holding exactly one value.
///
/// `select` overwrites whatever was held; nothing queues and no transition is
/// refused. Both operations report whether the held value actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: PartialEq> Slot<T> {
    pub fn select(&mut self, value: T) -> bool {
        if self.value.as_ref() == Some(&value) {
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn clear(&mut self) -> bool {
        self.value.take().is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Identifier of a recommended site shown on the prediction surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionRef(pub String);

/// The two independent selection registers.
///
/// `entity` backs the details panel and marker highlight; `prediction` backs
/// the predicted-site surface. Setting one never touches the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub entity: Slot<EntityRef>,
    pub prediction: Slot<PredictionRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_overwrites_previous_value() {
        let mut slot = Slot::default();
        assert!(slot.select(EntityRef::Asset("a".into())));
        assert!(slot.select(EntityRef::Renewable(4)));
        assert_eq!(slot.get(), Some(&EntityRef::Renewable(4)));
    }

    #[test]
    fn reselecting_same_value_is_a_no_op() {
        let mut slot = Slot::default();
        assert!(slot.select(EntityRef::DemandCenter("d".into())));
        assert!(!slot.select(EntityRef::DemandCenter("d".into())));
        assert_eq!(slot.get(), Some(&EntityRef::DemandCenter("d".into())));
    }

    #[test]
    fn clear_always_ends_empty() {
        let mut slot: Slot<EntityRef> = Slot::default();
        assert!(!slot.clear());
        slot.select(EntityRef::HydrogenPlant(1));
        slot.select(EntityRef::HydrogenPlant(2));
        assert!(slot.clear());
        assert!(slot.is_empty());
    }

    #[test]
    fn registers_are_independent() {
        let mut selection = Selection::default();
        selection.entity.select(EntityRef::Asset("a".into()));
        selection.prediction.select(PredictionRef("site-1".into()));
        selection.entity.clear();
        assert!(selection.entity.is_empty());
        assert_eq!(
            selection.prediction.get(),
            Some(&PredictionRef("site-1".into()))
        );
    }
}
