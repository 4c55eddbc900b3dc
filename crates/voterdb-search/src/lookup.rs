//! Exact lookups: EPIC number, booth (part number) and house number, all
//! ward-scoped.

use voterdb_core::types::Ward;

use crate::expr::{Field, Predicate};
use crate::like::contains_pattern;
use crate::params::{ParamKey, Params};
use crate::plan::{OrderTerm, SelectPlan};

pub const EPIC_ORDER: [OrderTerm; 1] = [OrderTerm::FullNameAsc];
pub const BOOTH_ORDER: [OrderTerm; 2] = [OrderTerm::SerialAsc, OrderTerm::FullNameAsc];

/// Case-insensitive equality on the EPIC number. The ward filter still
/// applies: a valid EPIC from another ward finds nothing.
pub fn epic_plan(epic: &str, ward: Ward, limit: usize) -> SelectPlan {
    let params = Params::new()
        .with(ParamKey::Ward, ward.to_string())
        .with(ParamKey::Epic, epic.trim());
    SelectPlan::in_ward("epic", params, Predicate::EqualsIgnoreCase(Field::EpicNumber, ParamKey::Epic))
        .ordered(&EPIC_ORDER)
        .limit(limit.max(1))
}

/// Everyone registered at one booth of the ward, in serial order.
pub fn booth_plan(part_no: &str, ward: Ward, limit: usize) -> SelectPlan {
    let params = Params::new()
        .with(ParamKey::Ward, ward.to_string())
        .with(ParamKey::Part, part_no.trim());
    SelectPlan::in_ward("booth", params, Predicate::Equals(Field::PartNo, ParamKey::Part))
        .ordered(&BOOTH_ORDER)
        .limit(limit.max(1))
}

/// Voters whose house/society number contains `house`, in booth serial order.
pub fn house_plan(house: &str, ward: Ward, limit: usize) -> SelectPlan {
    let params = Params::new()
        .with(ParamKey::Ward, ward.to_string())
        .with(ParamKey::HousePattern, contains_pattern(house.trim()));
    SelectPlan::in_ward("house", params, Predicate::ILike(Field::HouseNumber, ParamKey::HousePattern))
        .ordered(&BOOTH_ORDER)
        .limit(limit.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epic_lookup_is_upper_cased_on_both_sides() {
        let rendered = epic_plan(" nct6342834 ", Ward(146), 1).to_sql().unwrap();
        assert!(rendered.sql.contains("UPPER(v.epic_number) = UPPER($2)"));
        assert!(rendered.sql.ends_with("ORDER BY COALESCE(v.full_name::text, '') COLLATE \"C\" ASC LIMIT 1"));
        assert_eq!(rendered.binds, vec!["146", "nct6342834"]);
    }

    #[test]
    fn booth_listing_orders_by_serial() {
        let rendered = booth_plan("163", Ward(146), 50).to_sql().unwrap();
        assert!(rendered.sql.contains("v.part_no::text = $2"));
        assert!(rendered.sql.contains("ORDER BY LENGTH(v.sr_no::text) ASC, v.sr_no::text COLLATE \"C\" ASC, COALESCE(v.full_name::text, '') COLLATE \"C\" ASC"));
    }

    #[test]
    fn house_lookup_is_a_contains_match() {
        let rendered = house_plan(" B-7 ", Ward(146), 50).to_sql().unwrap();
        assert!(rendered.sql.contains("v.house_number::text ILIKE $2"));
        assert_eq!(rendered.binds, vec!["146", "%B-7%"]);
    }
}
