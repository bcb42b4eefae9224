//! Published result tables.

use crate::quantity::{IndexKeyType, QuantityDescription, QuantityName};
use crate::value_store::ValueRef;

/// Descriptions and value refs of the results a model publishes, in a fixed
/// order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: Vec<(QuantityDescription, ValueRef)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a result. The ref's length must equal the description's size.
    pub fn push(&mut self, description: QuantityDescription, value_ref: ValueRef) -> ValueRef {
        debug_assert_eq!(description.size, value_ref.len, "{}", description.name);
        self.entries.push((description, value_ref));
        value_ref
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptions(&self, out: &mut Vec<QuantityDescription>) {
        out.clear();
        out.extend(self.entries.iter().map(|(d, _)| d.clone()));
    }

    pub fn value_refs(&self, out: &mut Vec<ValueRef>) {
        out.clear();
        out.extend(self.entries.iter().map(|(_, r)| *r));
    }

    /// Point lookup by name and selector.
    ///
    /// Whole access returns the full range; element access goes through the
    /// description's index key type and fails for scalars and whole-only vectors.
    pub fn lookup(&self, quantity: &QuantityName) -> Option<ValueRef> {
        let (description, value_ref) = self.entries.iter().find(|(d, _)| d.name == quantity.name)?;
        if quantity.is_whole() {
            return Some(*value_ref);
        }
        if description.index_key_type == IndexKeyType::Scalar {
            return None;
        }
        value_ref.element(description.position_of(quantity.index)?)
    }

    pub fn get(&self, name: &str) -> Option<ValueRef> {
        self.lookup(&QuantityName::new(name))
    }

    pub fn description(&self, name: &str) -> Option<&QuantityDescription> {
        self.entries.iter().find(|(d, _)| d.name == name).map(|(d, _)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let mut rs = ResultSet::new();
        rs.push(QuantityDescription::scalar("Load", "W", ""), ValueRef { offset: 0, len: 1 });
        rs.push(
            QuantityDescription::keyed("HeatFlux", "W", "", vec![11, 12, 13]),
            ValueRef { offset: 1, len: 3 },
        );
        rs.push(QuantityDescription::whole_only("y", "J", "", 2), ValueRef { offset: 4, len: 2 });
        rs
    }

    #[test]
    fn lookup_rules() {
        let rs = sample();
        assert_eq!(rs.get("Load"), Some(ValueRef { offset: 0, len: 1 }));
        assert_eq!(rs.lookup(&QuantityName::indexed("Load", 0)), None);
        assert_eq!(
            rs.lookup(&QuantityName::indexed("HeatFlux", 13)),
            Some(ValueRef { offset: 3, len: 1 })
        );
        assert_eq!(rs.lookup(&QuantityName::indexed("HeatFlux", 2)), None);
        assert_eq!(rs.get("y"), Some(ValueRef { offset: 4, len: 2 }));
        assert_eq!(rs.lookup(&QuantityName::indexed("y", 0)), None);
        assert_eq!(rs.get("Unknown"), None);
    }

    #[test]
    fn descriptions_and_refs_agree() {
        let rs = sample();
        let mut d = Vec::new();
        let mut r = Vec::new();
        rs.descriptions(&mut d);
        rs.value_refs(&mut r);
        assert_eq!(d.len(), r.len());
        for (desc, vr) in d.iter().zip(&r) {
            assert_eq!(desc.size, vr.len);
        }
    }
}
