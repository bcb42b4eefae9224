//! Names and addresses of published quantities.

use std::fmt;
use zf_core::ObjectId;

/// How consumers address a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceType {
    Location,
    Zone,
    ConstructionInstance,
    EmbeddedObject,
    ActiveObject,
    Schedule,
    ObjectList,
    Model,
    Global,
    Network,
    NetworkElement,
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Name of a quantity plus an optional vector selector.
///
/// `index == -1` selects the whole vector (or a scalar); `index >= 0` selects
/// one element, either by position or by object id depending on the
/// quantity's [`IndexKeyType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuantityName {
    pub name: String,
    pub index: i64,
}

impl QuantityName {
    pub const WHOLE: i64 = -1;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: Self::WHOLE,
        }
    }

    pub fn indexed(name: impl Into<String>, index: i64) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    pub fn is_whole(&self) -> bool {
        self.index < 0
    }
}

impl fmt::Display for QuantityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.index)
        }
    }
}

/// How the `index` of a [`QuantityName`] maps onto a vector quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKeyType {
    /// Scalar quantity; only whole access.
    Scalar,
    /// Index is an object id out of `QuantityDescription::index_keys`.
    ModelId,
    /// Index is a 0-based position.
    Position,
    /// Vector that can only be read as a whole.
    WholeVectorOnly,
}

/// Metadata of a published result.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityDescription {
    pub name: String,
    pub unit: String,
    pub description: String,
    pub display_name: String,
    /// Value does not change during the run
    pub constant: bool,
    pub size: usize,
    pub index_key_type: IndexKeyType,
    /// Object ids for `IndexKeyType::ModelId`, one per vector element
    pub index_keys: Vec<ObjectId>,
}

impl QuantityDescription {
    pub fn scalar(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            unit: unit.into(),
            description: description.into(),
            constant: false,
            size: 1,
            index_key_type: IndexKeyType::Scalar,
            index_keys: Vec::new(),
        }
    }

    /// Vector keyed by object ids.
    pub fn keyed(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        keys: Vec<ObjectId>,
    ) -> Self {
        Self {
            size: keys.len(),
            index_key_type: IndexKeyType::ModelId,
            index_keys: keys,
            ..Self::scalar(name, unit, description)
        }
    }

    /// Vector addressed by position.
    pub fn positional(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        size: usize,
    ) -> Self {
        Self {
            size,
            index_key_type: IndexKeyType::Position,
            ..Self::scalar(name, unit, description)
        }
    }

    /// Vector without element access.
    pub fn whole_only(
        name: impl Into<String>,
        unit: impl Into<String>,
        description: impl Into<String>,
        size: usize,
    ) -> Self {
        Self {
            size,
            index_key_type: IndexKeyType::WholeVectorOnly,
            ..Self::scalar(name, unit, description)
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    /// Vector position selected by `index`, `None` if the selector is invalid.
    pub fn position_of(&self, index: i64) -> Option<usize> {
        if index < 0 {
            return None;
        }
        match self.index_key_type {
            IndexKeyType::Scalar | IndexKeyType::WholeVectorOnly => None,
            IndexKeyType::Position => {
                let pos = usize::try_from(index).ok()?;
                (pos < self.size).then_some(pos)
            }
            IndexKeyType::ModelId => {
                let key = ObjectId::try_from(index).ok()?;
                // linear; lookups only happen during wiring
                self.index_keys.iter().position(|&k| k == key)
            }
        }
    }
}

/// A consumer's request for a producer's quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputReference {
    pub reference_type: ReferenceType,
    pub id: ObjectId,
    pub name: QuantityName,
    /// If false the reference may stay unresolved without error.
    pub required: bool,
}

impl InputReference {
    pub fn new(
        reference_type: ReferenceType,
        id: ObjectId,
        name: QuantityName,
        required: bool,
    ) -> Self {
        Self {
            reference_type,
            id,
            name,
            required,
        }
    }

    pub fn required(reference_type: ReferenceType, id: ObjectId, name: QuantityName) -> Self {
        Self::new(reference_type, id, name, true)
    }

    pub fn optional(reference_type: ReferenceType, id: ObjectId, name: QuantityName) -> Self {
        Self::new(reference_type, id, name, false)
    }
}

impl fmt::Display for InputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(#{}).{}", self.reference_type, self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_name_equality_includes_index() {
        assert_eq!(QuantityName::new("HeatFlux"), QuantityName::indexed("HeatFlux", -1));
        assert_ne!(QuantityName::new("HeatFlux"), QuantityName::indexed("HeatFlux", 3));
        assert_ne!(QuantityName::new("HeatFlux"), QuantityName::new("heatflux"));
    }

    #[test]
    fn keyed_position_lookup() {
        let d = QuantityDescription::keyed("InfiltrationHeatFlux", "W", "", vec![4, 9, 2]);
        assert_eq!(d.size, 3);
        assert_eq!(d.position_of(9), Some(1));
        assert_eq!(d.position_of(5), None);
        assert_eq!(d.position_of(-1), None);
    }

    #[test]
    fn positional_and_whole_only() {
        let d = QuantityDescription::positional("v", "-", "", 2);
        assert_eq!(d.position_of(1), Some(1));
        assert_eq!(d.position_of(2), None);
        let y = QuantityDescription::whole_only("y", "J", "", 5);
        assert_eq!(y.position_of(0), None);
    }

    #[test]
    fn input_reference_display() {
        let r = InputReference::optional(
            ReferenceType::Model,
            7,
            QuantityName::indexed("InfiltrationHeatFlux", 3),
        );
        assert_eq!(r.to_string(), "Model(#7).InfiltrationHeatFlux[3]");
        assert!(!r.required);
    }
}
