use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::accession;
use crate::core::error::LegoError;
use crate::core::types::{ComponentId, FormationId, LegoNode, PointId};
use crate::model::component::ComponentCollection;
use crate::model::store::Model;

/// Two components (A and B) whose genes combine to form a third (C)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionEvent {
    pub index: usize,
    pub component_a: ComponentId,
    pub component_b: ComponentId,

    /// Components formed by the fusion
    pub products: BTreeSet<ComponentId>,

    /// Products not yet given a formation
    pub future_products: BTreeSet<ComponentId>,

    pub formations: Vec<Formation>,
}

impl FusionEvent {
    /// # Errors
    ///
    /// Returns `LegoError::InvariantViolation` if A and B are the same
    /// component, or if the products include either of them.
    pub fn new(
        index: usize,
        component_a: ComponentId,
        component_b: ComponentId,
        products: BTreeSet<ComponentId>,
    ) -> Result<Self, LegoError> {
        if component_a == component_b {
            return Err(LegoError::invariant(format!(
                "Fusion component A ({component_a}) cannot be component B ({component_b})"
            )));
        }

        if products.contains(&component_a) || products.contains(&component_b) {
            return Err(LegoError::invariant(format!(
                "Fusion products {products:?} cannot contain component A ({component_a}) or component B ({component_b})"
            )));
        }

        Ok(Self {
            index,
            component_a,
            component_b,
            future_products: products.clone(),
            products,
            formations: Vec::new(),
        })
    }

    /// The single product of the fusion.
    ///
    /// # Errors
    ///
    /// Returns `LegoError::InvariantViolation` unless there is exactly one product.
    pub fn component_c(&self) -> Result<ComponentId, LegoError> {
        let mut products = self.products.iter();
        match (products.next(), products.next()) {
            (Some(&only), None) => Ok(only),
            _ => Err(LegoError::invariant(format!(
                "Fusion event {} has {} products where exactly one was expected",
                self.index,
                self.products.len()
            ))),
        }
    }

    /// `(A+B=C)` using component names
    pub fn long_name(&self, model: &Model) -> String {
        let name = |id: ComponentId| {
            model
                .components
                .get(id)
                .map_or_else(|| format!("comp{id}"), |c| c.name(&model.sequences))
        };

        format!(
            "({}+{}={})",
            name(self.component_a),
            name(self.component_b),
            self.products
                .iter()
                .map(|&c| name(c))
                .collect::<Vec<_>>()
                .join(",")
        )
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.formations.iter().flat_map(|f| f.points.iter())
    }

    /// Both originating components
    pub fn sources(&self) -> [ComponentId; 2] {
        [self.component_a, self.component_b]
    }
}

/// Instance of a fusion event in one product component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub id: FormationId,
    pub component: ComponentId,

    /// Genes this formation creates
    pub sequences: BTreeSet<LegoNode>,

    /// `sequences` restricted to the majors of the formation's component
    pub pertinent_inner: BTreeSet<LegoNode>,

    pub points: Vec<Point>,
}

impl Formation {
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if `component` does not exist.
    pub fn new(
        id: FormationId,
        component: ComponentId,
        sequences: BTreeSet<LegoNode>,
        components: &ComponentCollection,
    ) -> Result<Self, LegoError> {
        let majors = &components.require(component)?.major_sequences;

        let pertinent_inner = sequences
            .iter()
            .filter(|node| node.as_sequence().is_some_and(|s| majors.contains(&s)))
            .copied()
            .collect();

        Ok(Self {
            id,
            component,
            sequences,
            pertinent_inner,
            points: Vec::new(),
        })
    }

    pub fn legacy_accession(&self) -> String {
        accession::format_formation(self.id.event, self.id.formation)
    }
}

/// Point at which genes from one side of a fusion join the product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,

    /// Genes from which this point originates
    pub outer_sequences: BTreeSet<LegoNode>,

    /// `outer_sequences` restricted to the majors of components A and B
    pub pertinent_outer: BTreeSet<LegoNode>,
}

impl Point {
    /// # Errors
    ///
    /// Returns `LegoError::NotFound` if either source component of `event`
    /// does not exist.
    pub fn new(
        id: PointId,
        event: &FusionEvent,
        outer_sequences: BTreeSet<LegoNode>,
        components: &ComponentCollection,
    ) -> Result<Self, LegoError> {
        let mut sources = BTreeSet::new();
        for component in event.sources() {
            sources.extend(components.require(component)?.major_sequences.iter().copied());
        }

        let pertinent_outer = outer_sequences
            .iter()
            .filter(|node| node.as_sequence().is_some_and(|s| sources.contains(&s)))
            .copied()
            .collect();

        Ok(Self {
            id,
            outer_sequences,
            pertinent_outer,
        })
    }

    pub fn node(&self) -> LegoNode {
        LegoNode::Point(self.id)
    }

    pub fn legacy_accession(&self) -> String {
        self.node().legacy_accession()
    }

    /// The formation's pertinent genes plus this point
    pub fn get_pertinent_inner(&self, formation: &Formation) -> BTreeSet<LegoNode> {
        let mut result = formation.pertinent_inner.clone();
        result.insert(self.node());
        result
    }

    /// The pertinent outer genes plus this point
    pub fn get_pertinent_outer(&self) -> BTreeSet<LegoNode> {
        let mut result = self.pertinent_outer.clone();
        result.insert(self.node());
        result
    }
}

/// The model's fusion events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusionEventCollection {
    events: Vec<FusionEvent>,

    /// Set once detection has run, even if it found nothing
    #[serde(default)]
    pub detected: bool,
}

impl FusionEventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: FusionEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.detected = false;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FusionEvent> {
        self.events.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FusionEvent> {
        self.events.get(index)
    }

    pub fn num_points(&self) -> usize {
        self.events.iter().map(|e| e.points().count()).sum()
    }

    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.events.get(id.event)?.formations.get(id.formation)
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.formation(id.formation_id())?.points.get(id.point)
    }

    /// Every point alongside its formation
    pub fn points(&self) -> impl Iterator<Item = (&Formation, &Point)> {
        self.events
            .iter()
            .flat_map(|e| e.formations.iter())
            .flat_map(|f| f.points.iter().map(move |p| (f, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SequenceId;

    fn ids(values: &[usize]) -> BTreeSet<ComponentId> {
        values.iter().map(|&v| ComponentId(v)).collect()
    }

    #[test]
    fn test_fusion_event_validation() {
        assert!(FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[2])).is_ok());
        assert!(matches!(
            FusionEvent::new(0, ComponentId(0), ComponentId(0), ids(&[2])),
            Err(LegoError::InvariantViolation(_))
        ));
        assert!(matches!(
            FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[0])),
            Err(LegoError::InvariantViolation(_))
        ));
        assert!(matches!(
            FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[2, 1])),
            Err(LegoError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_component_c_requires_single_product() {
        let single = FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[2])).unwrap();
        assert_eq!(single.component_c().unwrap(), ComponentId(2));

        let double = FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[2, 3])).unwrap();
        assert!(matches!(
            double.component_c(),
            Err(LegoError::InvariantViolation(_))
        ));

        let none = FusionEvent::new(0, ComponentId(0), ComponentId(1), ids(&[])).unwrap();
        assert!(none.component_c().is_err());
    }

    #[test]
    fn test_pertinent_sets_include_point() {
        let point = Point {
            id: PointId {
                event: 0,
                formation: 0,
                point: 1,
            },
            outer_sequences: BTreeSet::new(),
            pertinent_outer: [LegoNode::Sequence(SequenceId(4))].into(),
        };
        let formation = Formation {
            id: FormationId {
                event: 0,
                formation: 0,
            },
            component: ComponentId(2),
            sequences: BTreeSet::new(),
            pertinent_inner: [LegoNode::Sequence(SequenceId(9))].into(),
            points: Vec::new(),
        };

        assert_eq!(
            point.get_pertinent_inner(&formation),
            [LegoNode::Sequence(SequenceId(9)), point.node()].into()
        );
        assert_eq!(
            point.get_pertinent_outer(),
            [LegoNode::Sequence(SequenceId(4)), point.node()].into()
        );
        assert_eq!(point.legacy_accession(), "GrtP0P0P1");
        assert_eq!(formation.legacy_accession(), "GrtF0F0");
    }
}
