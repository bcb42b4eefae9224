//! Output sampling: a consumer that reads published quantities like any
//! other model and keeps them as a table.

use std::fmt::Write as _;

use tracing::debug;
use zf_core::ObjectId;
use zf_model::{
    InputReference, Model, ModelInfo, ModelKind, ModelResult, PRIORITY_OUTPUT_TAIL, QuantityName,
    ReferenceType, StateDependency, ValueRef, ValueStore, check_input_order,
};
use zf_project::{OutputDef, OutputReferenceType};

/// One active output column.
#[derive(Debug, Clone)]
pub struct OutputColumn {
    pub reference: InputReference,
    pub value_ref: ValueRef,
}

impl OutputColumn {
    /// Header of the column, e.g. `Zone(#1).AirTemperature`.
    pub fn header(&self) -> String {
        self.reference.to_string()
    }
}

/// Requests every configured output and records one row per sample.
///
/// Optional outputs that no model publishes are dropped from the table.
#[derive(Debug, Default)]
pub struct OutputHandler {
    refs: Vec<InputReference>,
    columns: Vec<OutputColumn>,
    current: Vec<f64>,
    times: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

pub fn reference_type(rt: OutputReferenceType) -> ReferenceType {
    match rt {
        OutputReferenceType::Location => ReferenceType::Location,
        OutputReferenceType::Zone => ReferenceType::Zone,
        OutputReferenceType::ConstructionInstance => ReferenceType::ConstructionInstance,
        OutputReferenceType::EmbeddedObject => ReferenceType::EmbeddedObject,
        OutputReferenceType::Model => ReferenceType::Model,
        OutputReferenceType::Network => ReferenceType::Network,
    }
}

impl OutputHandler {
    pub fn new(outputs: &[OutputDef]) -> Self {
        let refs = outputs
            .iter()
            .map(|o| {
                let name = match o.index {
                    Some(index) => QuantityName::indexed(o.quantity.clone(), index),
                    None => QuantityName::new(o.quantity.clone()),
                };
                InputReference::new(reference_type(o.reference_type), o.id, name, o.required)
            })
            .collect();
        Self {
            refs,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Values read in the last update, parallel to `columns`.
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Append the values of the last update as the row for time `t`.
    pub fn sample(&mut self, t: f64) {
        self.times.push(t);
        self.rows.push(self.current.clone());
    }

    /// Tab separated table with a `time [s]` column first.
    /// Drop all samples, keeping the columns.
    pub fn clear(&mut self) {
        self.times.clear();
        self.rows.clear();
    }

    pub fn write_tsv(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        let mut line = String::from("time [s]");
        for c in &self.columns {
            let _ = write!(line, "\t{}", c.header());
        }
        writeln!(out, "{line}")?;
        for (t, row) in self.times.iter().zip(&self.rows) {
            line.clear();
            let _ = write!(line, "{t}");
            for v in row {
                let _ = write!(line, "\t{v:.6}");
            }
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

impl Model for OutputHandler {
    fn reference_type(&self) -> Option<ReferenceType> {
        None
    }

    fn id(&self) -> ObjectId {
        0
    }

    fn display_name(&self) -> String {
        "OutputHandler".to_string()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Output
    }

    fn priority_of_model_evaluation(&self) -> i32 {
        PRIORITY_OUTPUT_TAIL
    }

    fn as_state_dependency(&self) -> Option<&dyn StateDependency> {
        Some(self)
    }

    fn as_state_dependency_mut(&mut self) -> Option<&mut dyn StateDependency> {
        Some(self)
    }
}

impl StateDependency for OutputHandler {
    fn init_input_references(&mut self, _models: &[ModelInfo]) -> ModelResult<()> {
        Ok(())
    }

    fn input_references(&self, out: &mut Vec<InputReference>) {
        out.clear();
        out.extend(self.refs.iter().cloned());
    }

    fn set_input_value_refs(
        &mut self,
        refs: &[InputReference],
        resolved: &[Option<ValueRef>],
    ) -> ModelResult<()> {
        check_input_order(&self.display_name(), &self.refs, refs, resolved)?;
        self.columns = refs
            .iter()
            .zip(resolved)
            .filter_map(|(reference, value_ref)| match *value_ref {
                Some(value_ref) => Some(OutputColumn {
                    reference: reference.clone(),
                    value_ref,
                }),
                None => {
                    debug!(
                        output = %reference,
                        "output not published by any model, column dropped"
                    );
                    None
                }
            })
            .collect();
        self.current = vec![0.0; self.columns.len()];
        Ok(())
    }

    fn update(&mut self, store: &mut ValueStore) -> ModelResult<()> {
        for (v, c) in self.current.iter_mut().zip(&self.columns) {
            *v = store.get(c.value_ref);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(quantity: &str, required: bool) -> OutputDef {
        OutputDef {
            reference_type: OutputReferenceType::Zone,
            id: 1,
            quantity: quantity.into(),
            index: None,
            required,
        }
    }

    #[test]
    fn unresolved_optional_output_drops_its_column() {
        let mut handler = OutputHandler::new(&[
            output("AirTemperature", true),
            output("RelativeHumidity", false),
            output("CompleteThermalLoad", false),
        ]);
        let mut store = ValueStore::new();
        let t = store.allocator(1).state_derived(1);
        let load = store.allocator(1).algebraic(1);
        store.set(t, 294.0);
        store.set(load, -12.5);

        let mut refs = Vec::new();
        handler.input_references(&mut refs);
        handler.set_input_value_refs(&refs, &[Some(t), None, Some(load)]).unwrap();
        assert_eq!(handler.columns().len(), 2);
        assert_eq!(handler.columns()[1].header(), "Zone(#1).CompleteThermalLoad");

        handler.update(&mut store).unwrap();
        handler.sample(3600.0);
        assert_eq!(handler.rows(), &[vec![294.0, -12.5]]);

        let mut tsv = Vec::new();
        handler.write_tsv(&mut tsv).unwrap();
        let tsv = String::from_utf8(tsv).unwrap();
        assert_eq!(
            tsv,
            "time [s]\tZone(#1).AirTemperature\tZone(#1).CompleteThermalLoad\n3600\t294.000000\t-12.500000\n"
        );
    }

    #[test]
    fn reordered_references_are_rejected() {
        let mut handler = OutputHandler::new(&[output(
            "AirTemperature",
            true,
        ), output("RelativeHumidity", false)]);
        let mut refs = Vec::new();
        handler.input_references(&mut refs);
        refs.swap(0, 1);
        assert!(handler.set_input_value_refs(&refs, &[None, None]).is_err());
    }
}
