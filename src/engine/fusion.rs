//! Fusion detection.
//!
//! Components A and B fuse into C when C draws genes from both: C is among
//! the incoming components of A and of B. Each product gets a formation, and
//! each formation one point per source whose genes C actually contains.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::core::error::LegoError;
use crate::core::fusion::{Formation, FusionEvent, Point};
use crate::core::types::{ComponentId, FormationId, LegoNode, PointId};
use crate::model::component::ComponentCollection;
use crate::model::stage::Stage;
use crate::model::store::Model;

/// Detect fusion events between every pair of components.
/// Returns the number of events found, which may be zero.
///
/// # Errors
///
/// Returns `LegoError::NotReady` if fusions were already detected or the
/// component trees are not complete.
pub fn create_fusions(model: &mut Model) -> Result<usize, LegoError> {
    model.assert_create(Stage::Fusions)?;

    let events = find_fusion_events(&model.components)?;

    for event in &events {
        info!("Fusion event {}", event.long_name(model));
    }

    let count = events.len();
    for event in events {
        model.fusion_events.add(event);
    }
    model.fusion_events.detected = true;

    Ok(count)
}

/// Build the fusion events of `components`, with their formations and points
///
/// # Errors
///
/// Returns `LegoError::InvariantViolation` or `LegoError::NotFound` if the
/// components are inconsistent.
pub fn find_fusion_events(components: &ComponentCollection) -> Result<Vec<FusionEvent>, LegoError> {
    let incoming: HashMap<ComponentId, BTreeSet<ComponentId>> = components
        .iter()
        .map(|c| (c.index, components.incoming_components(c.index).into_iter().collect()))
        .collect();

    let ids: Vec<ComponentId> = components.iter().map(|c| c.index).collect();
    let mut events = Vec::new();

    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let products: BTreeSet<ComponentId> = incoming[&a]
                .intersection(&incoming[&b])
                .copied()
                .filter(|&c| c != a && c != b)
                .collect();

            if products.is_empty() {
                continue;
            }

            debug!("Components {a} and {b} share products {products:?}");
            let event = FusionEvent::new(events.len(), a, b, products)?;
            events.push(add_formations(event, components)?);
        }
    }

    Ok(events)
}

fn add_formations(mut event: FusionEvent, components: &ComponentCollection) -> Result<FusionEvent, LegoError> {
    while let Some(product) = event.future_products.pop_first() {
        let minor = components.require(product)?.minor_sequences();

        let id = FormationId {
            event: event.index,
            formation: event.formations.len(),
        };
        let sequences = minor.iter().copied().map(LegoNode::Sequence).collect();
        let mut formation = Formation::new(id, product, sequences, components)?;

        for source in event.sources() {
            let majors = &components.require(source)?.major_sequences;
            let outer: BTreeSet<LegoNode> = minor
                .intersection(majors)
                .copied()
                .map(LegoNode::Sequence)
                .collect();

            if outer.is_empty() {
                continue;
            }

            let point_id = PointId {
                event: id.event,
                formation: id.formation,
                point: formation.points.len(),
            };
            formation.points.push(Point::new(point_id, &event, outer, components)?);
        }

        event.formations.push(formation);
    }

    Ok(event)
}
