//! Hierarchy Resolution Tests
//!
//! End-to-end checks of the display pipeline on realistic snapshots:
//! index construction, ancestor resolution, formatting, search and code
//! allocation.
//!
//! ## Test Coverage
//! - Full Region → Department → City chains
//! - Dangling and misdirected parent references
//! - Default ordering of display rows
//! - Code allocation over mixed numeric and free-form codes

#[cfg(test)]
mod hierarchy_resolution_tests {
    use locality_core::hierarchy::{
        build_locality, format_localities, next_code, search_rows, HierarchyIndex, NewLocality,
    };
    use locality_core::models::{Locality, LocalityStats, LocalityType, PLACEHOLDER};
    use serde_json::json;

    fn snapshot() -> Vec<Locality> {
        serde_json::from_value(json!([
            { "Id": 12, "Code": "12", "CodeNumber": "12", "Name": "DOUALA", "RegionStructureTypeId": 3, "ParentRegionStructureId": 11 },
            { "Id": 10, "Code": "10", "CodeNumber": "10", "Name": "LITTORAL", "RegionStructureTypeId": 1 },
            { "Id": 11, "Code": "11", "CodeNumber": "11", "Name": "WOURI", "RegionStructureTypeId": 2, "ParentRegionStructureId": 10 },
            { "Id": 20, "Code": "20", "CodeNumber": "20", "Name": "CENTRE", "RegionStructureTypeId": 1 },
            { "Id": 22, "Code": "22", "CodeNumber": "22", "Name": "YAOUNDE", "RegionStructureTypeId": 3, "ParentRegionStructureId": 21 },
            { "Id": 31, "Code": "31", "CodeNumber": "31", "Name": "NKAM", "RegionStructureTypeId": 2, "ParentRegionStructureId": 99 }
        ]))
        .unwrap()
    }

    // ========================================================================
    // Ancestor Resolution
    // ========================================================================

    #[test]
    fn test_city_with_full_chain() {
        let nodes = snapshot();
        let index = HierarchyIndex::new(&nodes);
        let douala = index.get(12).unwrap();

        assert_eq!(index.department_ancestor(douala).unwrap().name, "WOURI");
        assert_eq!(index.region_ancestor(douala).unwrap().name, "LITTORAL");
    }

    #[test]
    fn test_city_whose_department_is_missing() {
        let nodes = snapshot();
        let index = HierarchyIndex::new(&nodes);
        let yaounde = index.get(22).unwrap();

        assert!(index.department_ancestor(yaounde).is_none());
        assert!(index.region_ancestor(yaounde).is_none());
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    #[test]
    fn test_every_node_gets_a_row() {
        let rows = format_localities(&snapshot());
        assert_eq!(rows.len(), 6);

        let by_id = |id: i64| rows.iter().find(|r| r.id == id).unwrap();

        assert_eq!(by_id(12).region, "LITTORAL");
        assert_eq!(by_id(12).department, "WOURI");
        assert_eq!(by_id(22).region, PLACEHOLDER);
        assert_eq!(by_id(22).department, PLACEHOLDER);
        assert_eq!(by_id(22).city, "YAOUNDE");
        assert_eq!(by_id(31).region, PLACEHOLDER);
        assert_eq!(by_id(31).department, "NKAM");
        assert_eq!(by_id(20).department, PLACEHOLDER);
    }

    #[test]
    fn test_rows_are_grouped_by_level() {
        let rows = format_localities(&snapshot());
        let order: Vec<i64> = rows.iter().map(|r| r.id).collect();

        assert_eq!(order, vec![10, 20, 11, 31, 12, 22]);

        let stats = LocalityStats::from_rows(&rows);
        assert_eq!((stats.regions, stats.departments, stats.cities), (2, 2, 2));
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn test_search_spans_every_column() {
        let rows = format_localities(&snapshot());

        let hits: Vec<i64> = search_rows(&rows, "wou").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![11, 12]);

        let hits: Vec<i64> = search_rows(&rows, "31").iter().map(|r| r.id).collect();
        assert_eq!(hits, vec![31]);
    }

    // ========================================================================
    // Allocation and Building
    // ========================================================================

    #[test]
    fn test_new_city_joins_the_chain() {
        let mut nodes = snapshot();
        let code = next_code(&nodes);
        assert_eq!(code, "32");

        let city = build_locality(NewLocality {
            type_id: LocalityType::City,
            name: "bonaberi".to_string(),
            parent_id: Some(11),
            code: code.clone(),
            code_number: code,
        })
        .unwrap();
        nodes.push(city);

        let rows = format_localities(&nodes);
        let row = rows.iter().find(|r| r.id == 32).unwrap();
        assert_eq!(
            (row.region.as_str(), row.department.as_str(), row.city.as_str()),
            ("LITTORAL", "WOURI", "BONABERI")
        );
    }

    #[test]
    fn test_free_form_codes_are_skipped() {
        let mut nodes = snapshot();
        nodes.push(Locality::new(40, "CM-LT", "CM-LT", "X", LocalityType::Region, None));
        nodes.push(Locality::new(41, "7b", "7b", "Y", LocalityType::Region, None));

        assert_eq!(next_code(&nodes), "32");
    }
}
