//! Health-coin storefront.
//!
//! A fixed catalogue; prices are in rupees, `coins_required` in health coins.

use crate::pb;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreItem {
    pub id: u64,
    pub name: &'static str,
    pub description: &'static str,
    pub original_price: u64,
    pub discount_price: u64,
    pub coins_required: u64,
}

const fn item(
    id: u64,
    name: &'static str,
    description: &'static str,
    original_price: u64,
    discount_price: u64,
    coins_required: u64,
) -> StoreItem {
    StoreItem {
        id,
        name,
        description,
        original_price,
        discount_price,
        coins_required,
    }
}

#[rustfmt::skip]
static CATALOGUE: [StoreItem; 12] = [
    item(1, "Premium Health Checkup", "Comprehensive health screening with advanced diagnostics and specialist consultation", 8000, 6000, 150),
    item(2, "Dental Care Package", "Complete dental checkup with cleaning, X-rays, and cavity treatment", 5000, 3500, 100),
    item(3, "Vision Care Bundle", "Eye examination, prescription glasses, and contact lens fitting", 4000, 3000, 80),
    item(4, "Pharmacy Discount Card", "25% off on all medications for 3 months", 2000, 1500, 50),
    item(5, "Wellness Package", "Yoga classes, nutrition consultation, and fitness assessment", 6000, 4500, 120),
    item(6, "Lab Test Bundle", "Complete blood work, thyroid, vitamin, and hormone panel", 4500, 3200, 90),
    item(7, "Physiotherapy Sessions", "5 sessions with certified physiotherapist", 3500, 2500, 70),
    item(8, "Mental Health Care", "3 counseling sessions with professional therapist", 4500, 3500, 100),
    item(9, "Vaccination Package", "Essential vaccinations including flu shots", 3000, 2200, 60),
    item(10, "Nutrition Consultation", "Personalized diet plan and 2 follow-up sessions", 2500, 1800, 45),
    item(11, "Diagnostic Imaging", "MRI or CT scan with specialist consultation", 7000, 5500, 140),
    item(12, "Emergency Care Card", "20% discount on emergency room visits for 6 months", 5000, 3800, 110),
];

pub fn catalogue() -> &'static [StoreItem] {
    &CATALOGUE
}

pub fn find(id: u64) -> Option<&'static StoreItem> {
    CATALOGUE.iter().find(|item| item.id == id)
}

impl From<&StoreItem> for pb::StoreItem {
    fn from(item: &StoreItem) -> Self {
        pb::StoreItem {
            id: item.id,
            name: item.name.to_string(),
            description: item.description.to_string(),
            original_price: item.original_price,
            discount_price: item.discount_price,
            coins_required: item.coins_required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_discounts_are_real() {
        let mut ids: Vec<u64> = catalogue().iter().map(|i| i.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), catalogue().len());
        assert!(catalogue()
            .iter()
            .all(|i| i.discount_price < i.original_price && i.coins_required > 0));
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(4).map(|i| i.name), Some("Pharmacy Discount Card"));
        assert!(find(0).is_none());
        assert!(find(13).is_none());
    }
}
