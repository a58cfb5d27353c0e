use serde::{Deserialize, Serialize};

/// One apartment listing as shown on the vacancy page.
///
/// Equality covers every field, so a listing whose rent or move-in date
/// changes is a different listing as far as the snapshot is concerned.
/// The derived ordering exists so sets of listings iterate and serialize
/// in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Listing {
    pub url: String,
    pub apartment_type: String,
    pub adress: String,
    pub apartment_number: String,
    pub region: String,
    pub floor: u64,
    pub square_meters: u64,
    pub rent: u64,
    pub move_in_date: String,
}

#[cfg(test)]
pub(crate) fn sample(apartment_type: &str, square_meters: u64) -> Listing {
    Listing {
        url: "https://sssb.se/objekt/1201".to_string(),
        apartment_type: apartment_type.to_string(),
        adress: "Storgatan 1".to_string(),
        apartment_number: "1201".to_string(),
        region: "Lappkärrsberget".to_string(),
        floor: 3,
        square_meters,
        rent: 5_450,
        move_in_date: "2026-12-01".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_covers_every_field() {
        let a = sample("1 rum och kök", 30);
        let mut b = a.clone();
        assert_eq!(a, b);

        b.rent += 100;
        assert_ne!(a, b);
    }

    #[test]
    fn sets_dedup_on_full_record() {
        let a = sample("1 rum och kök", 30);
        let mut moved = a.clone();
        moved.move_in_date = "2027-01-01".to_string();

        let set: HashSet<Listing> = [a.clone(), a.clone(), moved].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejects_unknown_field() {
        let json = r#"{
            "url": "u", "apartment_type": "t", "adress": "a",
            "apartment_number": "1", "region": "r", "floor": 1,
            "square_meters": 20, "rent": 100, "move_in_date": "d",
            "balcony": true
        }"#;
        assert!(serde_json::from_str::<Listing>(json).is_err());
    }

    #[test]
    fn rejects_missing_or_mistyped_field() {
        let missing = r#"{
            "url": "u", "apartment_type": "t", "adress": "a",
            "apartment_number": "1", "region": "r", "floor": 1,
            "square_meters": 20, "rent": 100
        }"#;
        assert!(serde_json::from_str::<Listing>(missing).is_err());

        let mistyped = r#"{
            "url": "u", "apartment_type": "t", "adress": "a",
            "apartment_number": "1", "region": "r", "floor": "first",
            "square_meters": 20, "rent": 100, "move_in_date": "d"
        }"#;
        assert!(serde_json::from_str::<Listing>(mistyped).is_err());
    }
}
