use super::*;
use rust_decimal_macros::dec;

// =============================================================================
// matching
// =============================================================================

#[test]
fn empty_query_matches_everything() {
    assert!(matches("Majestic", ""));
    assert!(matches("Majestic", "   "));
}

#[test]
fn match_is_trimmed_and_case_insensitive() {
    assert!(matches("Electronic City", "  electronic "));
    assert!(!matches("Electronic City", "whitefield"));
}

#[test]
fn route_match_checks_each_end_separately() {
    assert!(route_matches("Majestic to Whitefield", "maj", "white"));
    // Reversed direction does not match.
    assert!(!route_matches("Majestic to Whitefield", "white", "maj"));
    assert!(route_matches("Majestic to Whitefield", "", "field"));
}

// =============================================================================
// BMTC
// =============================================================================

#[test]
fn bmtc_has_four_routes_with_labels() {
    assert_eq!(bmtc_routes().len(), 4);
    let view = BmtcRouteView::from(&bmtc_routes()[0]);
    assert_eq!(view.fare_label, "₹75");
    assert_eq!(view.frequency, "10 mins");
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["number"], "500D");
    assert_eq!(json["fare_label"], "₹75");
}

#[test]
fn bmtc_search_by_ends() {
    let found = search_bmtc("shivaji", "electronic");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].number, "356CW");
    assert_eq!(search_bmtc("", "").len(), 4);
    assert!(search_bmtc("hebbal", "").is_empty());
}

#[test]
fn bmtc_lookup_by_id_or_number() {
    assert_eq!(find_bmtc("2").unwrap().number, "368");
    assert_eq!(find_bmtc("501d").unwrap().name, "Banashankari to ITPL");
    assert!(matches!(find_bmtc("999"), Err(CatalogError::NotFound(_))));
}

// =============================================================================
// KSRTC
// =============================================================================

#[test]
fn ksrtc_class_filter() {
    let sleepers = search_ksrtc("bangalore", "", Some(BusClass::Sleeper));
    let names: Vec<_> = sleepers.iter().map(|r| r.name).collect();
    assert_eq!(names, ["Bangalore to Mangalore", "Bangalore to Hubli"]);

    let nonac = search_ksrtc("", "belgaum", Some(BusClass::NonAc));
    assert_eq!(nonac.len(), 1);
    assert!(search_ksrtc("", "mysore", Some(BusClass::Sleeper)).is_empty());
}

#[test]
fn bus_class_parses_loosely() {
    assert_eq!(BusClass::parse("AC"), Some(BusClass::Ac));
    assert_eq!(BusClass::parse("non-ac"), Some(BusClass::NonAc));
    assert_eq!(BusClass::parse("nonac"), Some(BusClass::NonAc));
    assert_eq!(BusClass::parse("volvo"), None);
    assert_eq!(serde_json::to_value(BusClass::NonAc).unwrap(), "nonac");
}

#[test]
fn ksrtc_lookup_and_view() {
    let route = find_ksrtc(2).unwrap();
    assert_eq!(route.duration, "8h");
    assert_eq!(KsrtcRouteView::from(route).fare_label, "₹950");
    assert!(find_ksrtc(9).is_err());
}

#[test]
fn student_pass_is_bilingual() {
    let en = student_pass(Locale::En);
    let kn = student_pass(Locale::Kn);
    assert_eq!(en.documents.len(), 5);
    assert_eq!(kn.documents.len(), 5);
    assert_eq!(en.benefits[0], "50% discount on all KSRTC buses");
    assert_eq!(kn.title, "ವಿದ್ಯಾರ್ಥಿ ಬಸ್ ಪಾಸ್ ಮಾಹಿತಿ");
}

// =============================================================================
// Metro
// =============================================================================

#[test]
fn running_lines_can_be_selected() {
    let line = select_metro("purple").unwrap();
    assert_eq!(line.name, "Purple Line");
    assert_eq!(line.frequency_label(), "7 mins");
    assert_eq!(select_metro("2").unwrap().name, "Green Line");
}

#[test]
fn lines_under_construction_are_refused() {
    assert!(matches!(select_metro("Yellow Line"), Err(CatalogError::UnderConstruction("Yellow Line"))));
    assert!(matches!(select_metro("4"), Err(CatalogError::UnderConstruction(_))));
    assert_eq!(metro_lines()[3].frequency_label(), "N/A");
}

#[test]
fn unknown_line_is_not_found() {
    assert!(matches!(select_metro("blue"), Err(CatalogError::NotFound(_))));
}

#[test]
fn station_finder_searches_termini() {
    let found = find_stations("kengeri");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Purple Line");
    assert_eq!(find_stations("").len(), 4);
}

#[test]
fn line_status_serializes_as_display_text() {
    let json = serde_json::to_value(metro_lines()[2]).unwrap();
    assert_eq!(json["status"], "Under Construction");
}

// =============================================================================
// Auto / taxi
// =============================================================================

#[test]
fn tariff_labels() {
    let views: Vec<TaxiServiceView> = taxi_services().iter().map(TaxiServiceView::from).collect();
    assert_eq!(views[0].base_price, "₹30 + ₹15/km");
    assert_eq!(views[0].waiting_time, "₹1/min");
    assert_eq!(views[1].base_price, "₹300 + ₹20/km");
    assert_eq!(views[2].base_price, "₹2,000-₹4,000/day");
    assert_eq!(views[2].waiting_time, "N/A");
    assert_eq!(views[3].base_price, "Custom packages");
}

#[test]
fn city_ride_estimate() {
    let est = estimate_fare(1, dec!(10), 5).unwrap();
    assert_eq!(est.total, dec!(185));
    assert_eq!(est.total_label, "₹185");
}

#[test]
fn airport_estimate_with_fractional_distance() {
    let est = estimate_fare(2, dec!(12.5), 0).unwrap();
    assert_eq!(est.total, dec!(550));
    let est = estimate_fare(1, dec!(3.33), 0).unwrap();
    assert_eq!(est.total, dec!(79.95));
    assert_eq!(est.total_label, "₹79.95");
}

#[test]
fn unmetered_and_invalid_estimates_fail() {
    assert!(matches!(estimate_fare(3, dec!(100), 0), Err(CatalogError::NotMetered("Outstation Trips"))));
    assert!(matches!(estimate_fare(4, dec!(1), 0), Err(CatalogError::NotMetered(_))));
    assert!(matches!(estimate_fare(9, dec!(1), 0), Err(CatalogError::NotFound(_))));
    assert!(matches!(estimate_fare(1, dec!(-1), 0), Err(CatalogError::InvalidInput(_))));
}

#[test]
fn oversized_distance_is_rejected() {
    let huge: Decimal = "70000000000000000000000000000".parse().unwrap();
    assert!(matches!(estimate_fare(1, huge, 0), Err(CatalogError::InvalidInput("distance_km"))));
    assert!(matches!(estimate_fare(2, Decimal::MAX, u32::MAX), Err(CatalogError::InvalidInput(_))));
}

#[test]
fn zero_distance_costs_the_base_fare() {
    assert_eq!(estimate_fare(1, dec!(0), 0).unwrap().total, dec!(30));
}
