use std::cmp::Ordering;

use wayfare_core::Offer;

/// Best-value offers first, then ascending price.
///
/// Upstream badges are trusted as sent; nothing here recomputes cheapest or
/// fastest. NaN prices compare after every real amount.
pub fn display_order(a: &Offer, b: &Offer) -> Ordering {
    b.is_best_value
        .cmp(&a.is_best_value)
        .then_with(|| a.price.amount.total_cmp(&b.price.amount))
}

/// Offers in display order. Ties keep the order the aggregator sent.
pub fn rank_for_display(offers: &[Offer]) -> Vec<&Offer> {
    let mut ranked: Vec<&Offer> = offers.iter().collect();
    ranked.sort_by(|a, b| display_order(a, b));
    ranked
}

pub fn rank_in_place(offers: &mut [Offer]) {
    offers.sort_by(display_order);
}
