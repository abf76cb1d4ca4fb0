use crate::models::{FoodItem, Organization};

/// Only active, verified organizations may receive donations
#[inline]
pub fn is_available(org: &Organization) -> bool {
    org.active && org.verified
}

/// Check the summed requested quantity against the organization's capacity
#[inline]
pub fn has_capacity_for(org: &Organization, items: &[FoodItem]) -> bool {
    let total: u64 = items.iter().map(|item| u64::from(item.quantity)).sum();
    total <= u64::from(org.capacity)
}

/// Check that no requested item is on the organization's restriction list
///
/// Names are compared case-insensitively.
pub fn accepts_items(org: &Organization, items: &[FoodItem]) -> bool {
    if org.restrictions.is_empty() {
        return true;
    }

    let restricted: Vec<String> = org
        .restrictions
        .iter()
        .map(|r| r.trim().to_lowercase())
        .collect();

    !items
        .iter()
        .any(|item| restricted.contains(&item.name.trim().to_lowercase()))
}

/// Full eligibility check for a donation
///
/// Without requested items only the availability flags are checked.
pub fn is_eligible(org: &Organization, items: Option<&[FoodItem]>) -> bool {
    if !is_available(org) {
        return false;
    }

    match items {
        Some(items) => has_capacity_for(org, items) && accepts_items(org, items),
        None => true,
    }
}
