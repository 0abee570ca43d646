//! Tests for LocalityService
//!
//! Run against the in-memory store, except where persistence across
//! reopen matters.

#[cfg(test)]
mod tests {
    use crate::db::{JsonFileStore, MemoryStore};
    use crate::models::{LocalityFilter, LocalityType, ValidationError};
    use crate::services::import::{parse_import_str, Decision, ImportSession};
    use crate::services::{LocalityEvent, LocalityService, LocalityServiceError};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_service() -> LocalityService {
        LocalityService::new(Arc::new(MemoryStore::new()))
    }

    /// LITTORAL > WOURI > DOUALA, ids 1, 2 and 3
    async fn seed_chain(service: &LocalityService) {
        let region = service
            .create_locality(LocalityType::Region, "Littoral", None)
            .await
            .unwrap();
        let department = service
            .create_locality(LocalityType::Department, "Wouri", Some(region.id))
            .await
            .unwrap();
        service
            .create_locality(LocalityType::City, "  douala ", Some(department.id))
            .await
            .unwrap();
    }

    // ========================================================================
    // Creation
    // ========================================================================

    #[tokio::test]
    async fn test_create_allocates_sequential_codes() {
        let service = create_test_service();
        seed_chain(&service).await;

        let snapshot = service.load_snapshot().await.unwrap();
        let summary: Vec<(i64, &str, &str, &str)> = snapshot
            .iter()
            .map(|l| (l.id, l.code.as_str(), l.code_number.as_str(), l.name.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (1, "1", "1", "LITTORAL"),
                (2, "2", "2", "WOURI"),
                (3, "3", "3", "DOUALA"),
            ]
        );
        assert_eq!(snapshot[2].parent_id, Some(2));
        assert_eq!(snapshot[2].nist_code.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_create_rejects_inconsistent_parent() {
        let service = create_test_service();
        seed_chain(&service).await;

        // A city under a region
        let err = service
            .create_locality(LocalityType::City, "Edea", Some(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocalityServiceError::ValidationFailed(ValidationError::InvalidParent(_))
        ));

        let err = service
            .create_locality(LocalityType::Department, "Nkam", Some(404))
            .await
            .unwrap_err();
        assert!(matches!(err, LocalityServiceError::ValidationFailed(_)));

        let err = service
            .create_locality(LocalityType::Region, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocalityServiceError::ValidationFailed(ValidationError::MissingField(_))
        ));

        assert_eq!(service.load_snapshot().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_many_reports_duplicates() {
        let service = create_test_service();
        seed_chain(&service).await;

        let mut duplicate = service.get(1).await.unwrap();
        duplicate.id = 50;
        duplicate.code_number = "50".to_string();

        let err = service.create_many(vec![duplicate]).await.unwrap_err();
        assert!(err.is_duplicate_key());

        let err = service.create_many(Vec::new()).await.unwrap_err();
        assert!(matches!(err, LocalityServiceError::ValidationFailed(_)));
    }

    // ========================================================================
    // Reads
    // ========================================================================

    #[tokio::test]
    async fn test_formatted_rows_and_stats() {
        let service = create_test_service();
        seed_chain(&service).await;

        let rows = service.formatted_rows().await.unwrap();
        let city = &rows[2];
        assert_eq!(
            (city.region.as_str(), city.department.as_str(), city.city.as_str()),
            ("LITTORAL", "WOURI", "DOUALA")
        );

        let stats = service.stats().await.unwrap();
        assert_eq!((stats.regions, stats.departments, stats.cities), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let service = create_test_service();
        seed_chain(&service).await;
        service
            .create_locality(LocalityType::Department, "Moungo", Some(1))
            .await
            .unwrap();

        let departments = service
            .list(&LocalityFilter::new().with_parent(1))
            .await
            .unwrap();
        assert_eq!(departments.len(), 2);

        let named = service
            .list(&LocalityFilter::new().with_name_pattern("^w"))
            .await
            .unwrap();
        assert_eq!(named[0].name, "WOURI");

        let err = service
            .list(&LocalityFilter::new().with_name_pattern("("))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocalityServiceError::ValidationFailed(ValidationError::InvalidFilter(_))
        ));
    }

    // ========================================================================
    // Replace / Delete
    // ========================================================================

    #[tokio::test]
    async fn test_replace_is_a_full_replacement() {
        let service = create_test_service();
        seed_chain(&service).await;

        let mut city = service.get(3).await.unwrap();
        city.name = "DOUALA I".to_string();
        city.nist_code = None;

        let replaced = service.replace_locality(3, city).await.unwrap();
        assert_eq!(replaced.name, "DOUALA I");
        assert_eq!(service.get(3).await.unwrap().nist_code, None);

        let other = service.get(2).await.unwrap();
        let err = service.replace_locality(3, other).await.unwrap_err();
        assert!(matches!(
            err,
            LocalityServiceError::ValidationFailed(ValidationError::IdMismatch { expected: 3, actual: 2 })
        ));

        let mut ghost = service.get(3).await.unwrap();
        ghost.id = 99;
        let err = service.replace_locality(99, ghost).await.unwrap_err();
        assert!(matches!(err, LocalityServiceError::NotFound { id: 99 }));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = create_test_service();
        seed_chain(&service).await;

        service.delete_locality(3).await.unwrap();
        assert!(matches!(
            service.delete_locality(3).await.unwrap_err(),
            LocalityServiceError::NotFound { id: 3 }
        ));

        let result = service.delete_localities(&[1, 2, 404]).await.unwrap();
        assert_eq!(result.deleted_count, 2);
        assert!(service.load_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_events_are_broadcast() {
        let service = create_test_service();
        let mut rx = service.subscribe_to_events();

        let region = service
            .create_locality(LocalityType::Region, "Centre", None)
            .await
            .unwrap();
        service.delete_locality(region.id).await.unwrap();

        match rx.recv().await.unwrap() {
            LocalityEvent::Created(records) => assert_eq!(records[0].name, "CENTRE"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(
            rx.recv().await.unwrap(),
            LocalityEvent::Deleted { ids: vec![region.id] }
        );
    }

    // ========================================================================
    // Import / Export
    // ========================================================================

    #[tokio::test]
    async fn test_export_then_import_is_a_noop() {
        let service = create_test_service();
        seed_chain(&service).await;

        let exported = service.export(None).await.unwrap();
        let plan = service
            .plan_import(parse_import_str(&exported).unwrap())
            .await
            .unwrap();

        assert!(!plan.has_conflicts());
        assert!(plan.pure_new.is_empty());
        assert_eq!(plan.unchanged.len(), 3);

        let mut session = ImportSession::new();
        session.apply(Decision::Submit(plan)).unwrap();
        let report = service.commit_import(&mut session, |_| {}).await.unwrap();

        assert_eq!(report.result.inserted, 0);
        assert_eq!(report.result.modified, 0);
    }

    #[tokio::test]
    async fn test_round_trip_of_records_stored_without_code_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("localities.json");
        tokio::fs::write(
            &path,
            r#"[{ "Id": 1, "Code": "1", "Name": "LITTORAL", "RegionStructureTypeId": 1 }]"#,
        )
        .await
        .unwrap();

        let service = LocalityService::new(Arc::new(JsonFileStore::open(&path).await.unwrap()));
        assert_eq!(service.get(1).await.unwrap().code_number, "1");

        let exported = service.export(None).await.unwrap();
        let plan = service
            .plan_import(parse_import_str(&exported).unwrap())
            .await
            .unwrap();

        assert!(plan.conflicts.is_empty());
        assert!(plan.pure_new.is_empty());
        assert_eq!(plan.unchanged.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_delete_event_lists_only_removed_ids() {
        let service = create_test_service();
        seed_chain(&service).await;
        let mut rx = service.subscribe_to_events();

        let result = service.delete_localities(&[404, 3, 2]).await.unwrap();
        assert_eq!(result.deleted_ids, vec![2, 3]);

        assert_eq!(
            rx.recv().await.unwrap(),
            LocalityEvent::Deleted { ids: vec![2, 3] }
        );
    }

    #[tokio::test]
    async fn test_export_selected_ids() {
        let service = create_test_service();
        seed_chain(&service).await;

        let exported = service.export(Some(&[2])).await.unwrap();
        let records = parse_import_str(&exported).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "WOURI");
    }

    #[tokio::test]
    async fn test_import_with_accepted_conflict() {
        let service = create_test_service().with_chunk_size(1);
        seed_chain(&service).await;

        let payload = r#"[
            { "Id": 3, "Code": "3", "CodeNumber": "3", "Name": "DOUALA V", "RegionStructureTypeId": 3, "ParentRegionStructureId": 2 },
            { "Id": 4, "Code": "4", "Name": "EDEA", "RegionStructureTypeId": 3, "ParentRegionStructureId": 2 }
        ]"#;
        let plan = service
            .plan_import(parse_import_str(payload).unwrap())
            .await
            .unwrap();
        assert_eq!(plan.conflicts.len(), 1);

        let mut session = ImportSession::new();
        session.apply(Decision::Submit(plan)).unwrap();
        assert!(service.commit_import(&mut session, |_| {}).await.is_err());

        session.apply(Decision::AcceptAll).unwrap();
        let mut progress = Vec::new();
        let report = service
            .commit_import(&mut session, |p| progress.push(p.percent))
            .await
            .unwrap();

        assert_eq!(progress, vec![50, 100]);
        assert_eq!(report.result.inserted, 1);
        assert_eq!(report.result.modified, 1);
        assert_eq!(service.get(3).await.unwrap().name, "DOUALA V");
    }

    #[tokio::test]
    async fn test_json_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("localities.json");

        let service = LocalityService::new(Arc::new(JsonFileStore::open(&path).await.unwrap()));
        seed_chain(&service).await;

        let reopened = LocalityService::new(Arc::new(JsonFileStore::open(&path).await.unwrap()));
        let rows = reopened.formatted_rows().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].city, "DOUALA");
    }
}
