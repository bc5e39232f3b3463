//! State transition planner
//!
//! Pure functions computing the two updates applied to every synced order.
//! No I/O and no clock: identical inputs always give identical output.

use crate::domain::{LineItem, OrderUpdateAction, ResourceIdentifier, UpdateAction};

/// Plans the update attaching sync info for `channel_id`
pub fn plan_sync_info_update(
    version: u64,
    channel_id: &str,
    external_id: Option<&str>,
) -> UpdateAction {
    UpdateAction {
        version,
        actions: vec![OrderUpdateAction::UpdateSyncInfo {
            channel: ResourceIdentifier::channel(channel_id),
            external_id: external_id.map(str::to_string),
        }],
    }
}

/// Plans the update moving every line item to `target_state_id`
///
/// Emits one transition per state bucket, in line item order then bucket
/// order, carrying the bucket's quantity unchanged. Orders without line
/// items get an update with no actions.
pub fn plan_line_item_transition(
    line_items: &[LineItem],
    target_state_id: &str,
    version: u64,
) -> UpdateAction {
    let actions = line_items
        .iter()
        .flat_map(|item| {
            item.state
                .iter()
                .map(move |bucket| OrderUpdateAction::TransitionLineItemState {
                    line_item_id: item.id.clone(),
                    quantity: bucket.quantity,
                    from_state: bucket.state.clone(),
                    to_state: ResourceIdentifier::state(target_state_id),
                })
        })
        .collect();

    UpdateAction { version, actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemState;

    fn item(id: &str, buckets: &[(&str, u64)]) -> LineItem {
        LineItem {
            id: id.to_string(),
            product_id: None,
            variant: None,
            quantity: buckets.iter().map(|(_, q)| q).sum(),
            state: buckets
                .iter()
                .map(|(state, quantity)| ItemState {
                    quantity: *quantity,
                    state: ResourceIdentifier::state(*state),
                })
                .collect(),
        }
    }

    #[test]
    fn test_sync_info_update() {
        let update = plan_sync_info_update(7, "chan-1", Some("gs://bucket/orders.csv"));
        assert_eq!(update.version, 7);
        assert_eq!(
            update.actions,
            vec![OrderUpdateAction::UpdateSyncInfo {
                channel: ResourceIdentifier::channel("chan-1"),
                external_id: Some("gs://bucket/orders.csv".to_string()),
            }]
        );
    }

    #[test]
    fn test_transition_per_bucket_in_order() {
        let items = vec![
            item("li-1", &[("initial", 2), ("shipped", 1)]),
            item("li-2", &[("initial", 5)]),
        ];

        let update = plan_line_item_transition(&items, "exported", 8);

        assert_eq!(update.version, 8);
        assert_eq!(
            update.actions,
            vec![
                OrderUpdateAction::TransitionLineItemState {
                    line_item_id: "li-1".to_string(),
                    quantity: 2,
                    from_state: ResourceIdentifier::state("initial"),
                    to_state: ResourceIdentifier::state("exported"),
                },
                OrderUpdateAction::TransitionLineItemState {
                    line_item_id: "li-1".to_string(),
                    quantity: 1,
                    from_state: ResourceIdentifier::state("shipped"),
                    to_state: ResourceIdentifier::state("exported"),
                },
                OrderUpdateAction::TransitionLineItemState {
                    line_item_id: "li-2".to_string(),
                    quantity: 5,
                    from_state: ResourceIdentifier::state("initial"),
                    to_state: ResourceIdentifier::state("exported"),
                },
            ]
        );
    }

    #[test]
    fn test_no_line_items_yields_empty_update() {
        let update = plan_line_item_transition(&[], "exported", 3);
        assert_eq!(update.version, 3);
        assert!(update.is_empty());
    }

    #[test]
    fn test_planning_is_deterministic() {
        let items = vec![item("li-1", &[("a", 1), ("b", 2)]), item("li-2", &[])];
        let first = serde_json::to_vec(&plan_line_item_transition(&items, "x", 1)).unwrap();
        let second = serde_json::to_vec(&plan_line_item_transition(&items, "x", 1)).unwrap();
        assert_eq!(first, second);
    }
}
