use chrono::NaiveDate;
use gradebook_core::{
    EntityKey, Score, ScoreKey, ScoreService, ServiceError, Services, Store, Student,
    StudentService, Subject, SubjectService, ValidationError,
};

fn setup() -> Services {
    let services = Services::local(Store::open_in_memory().unwrap());
    services
        .students
        .add(&Student::new(
            "SV01",
            "An",
            NaiveDate::from_ymd_opt(2003, 9, 1).unwrap(),
            "Ha Noi",
        ))
        .unwrap();
    services
        .subjects
        .add(&Subject::new("MH01", "Giai tich", 3))
        .unwrap();
    services
}

fn average(services: &Services, msv: &str) -> f64 {
    services.students.find_by_id(msv).unwrap().unwrap().diem_tb
}

#[test]
fn add_assigns_id_and_is_readable_by_key() {
    let services = setup();

    let created = services
        .scores
        .add(&Score::new("SV01", "MH01", 7.5))
        .unwrap();
    assert!(created.id.is_some());

    let loaded = services.scores.find_by_key("SV01", "MH01").unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn returned_id_finds_the_same_row_until_it_is_deleted() {
    let services = setup();

    let created = services
        .scores
        .add(&Score::new("SV01", "MH01", 6.0))
        .unwrap();
    let id = created.id.unwrap();

    services
        .scores
        .update(&Score::new("SV01", "MH01", 9.0))
        .unwrap();
    let by_id = services.scores.find_by_id(id).unwrap().unwrap();
    assert_eq!(by_id.id, Some(id));
    assert_eq!(by_id.diem, 9.0);

    services.scores.delete("SV01", "MH01").unwrap();
    assert_eq!(services.scores.find_by_id(id).unwrap(), None);
    assert_eq!(services.scores.find_by_id(id + 1000).unwrap(), None);
}

#[test]
fn add_with_missing_student_or_subject_returns_not_found() {
    let services = setup();

    let missing_student = services
        .scores
        .add(&Score::new("SV404", "MH01", 5.0))
        .unwrap_err();
    assert_eq!(
        missing_student,
        ServiceError::NotFound(EntityKey::student("SV404"))
    );

    let missing_subject = services
        .scores
        .add(&Score::new("SV01", "MH404", 5.0))
        .unwrap_err();
    assert_eq!(
        missing_subject,
        ServiceError::NotFound(EntityKey::subject("MH404"))
    );
    assert!(services.scores.get_all().unwrap().is_empty());
}

#[test]
fn add_out_of_range_score_is_rejected_without_row() {
    let services = setup();

    for diem in [-0.5, 10.5, f64::NAN] {
        let err = services
            .scores
            .add(&Score::new("SV01", "MH01", diem))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::ScoreOutOfRange { .. })
        ));
    }
    assert!(services.scores.get_all().unwrap().is_empty());
}

#[test]
fn range_check_runs_before_reference_check() {
    let services = setup();

    let err = services
        .scores
        .add(&Score::new("SV404", "MH01", 11.0))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn second_score_for_same_pair_is_duplicate() {
    let services = setup();
    services
        .scores
        .add(&Score::new("SV01", "MH01", 7.0))
        .unwrap();

    let err = services
        .scores
        .add(&Score::new("SV01", "MH01", 9.0))
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::DuplicateKey(EntityKey::score(&ScoreKey::new("SV01", "MH01")))
    );
    assert_eq!(
        services
            .scores
            .find_by_key("SV01", "MH01")
            .unwrap()
            .unwrap()
            .diem,
        7.0
    );
}

#[test]
fn update_replaces_value_and_keeps_identity() {
    let services = setup();
    let created = services
        .scores
        .add(&Score::new("SV01", "MH01", 4.0))
        .unwrap();

    let mut changed = Score::new("SV01", "MH01", 9.0);
    changed.id = Some(9_999);
    let updated = services.scores.update(&changed).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.diem, 9.0);
    assert_eq!(average(&services, "SV01"), 9.0);
}

#[test]
fn update_validates_range_and_existence() {
    let services = setup();
    services
        .scores
        .add(&Score::new("SV01", "MH01", 4.0))
        .unwrap();

    let invalid = services
        .scores
        .update(&Score::new("SV01", "MH01", 12.0))
        .unwrap_err();
    assert!(matches!(invalid, ServiceError::Validation(_)));
    assert_eq!(average(&services, "SV01"), 4.0);

    services
        .subjects
        .add(&Subject::new("MH02", "Vat ly", 2))
        .unwrap();
    let missing = services
        .scores
        .update(&Score::new("SV01", "MH02", 5.0))
        .unwrap_err();
    assert_eq!(
        missing,
        ServiceError::NotFound(EntityKey::score(&ScoreKey::new("SV01", "MH02")))
    );
}

#[test]
fn delete_missing_score_returns_not_found() {
    let services = setup();

    let err = services.scores.delete("SV01", "MH01").unwrap_err();
    assert_eq!(
        err,
        ServiceError::NotFound(EntityKey::score(&ScoreKey::new("SV01", "MH01")))
    );
}

#[test]
fn average_is_mean_of_all_scores() {
    let services = setup();
    services
        .subjects
        .add(&Subject::new("MH02", "Vat ly", 2))
        .unwrap();
    services
        .subjects
        .add(&Subject::new("MH03", "Hoa hoc", 2))
        .unwrap();

    services
        .scores
        .add(&Score::new("SV01", "MH01", 6.0))
        .unwrap();
    services
        .scores
        .add(&Score::new("SV01", "MH02", 10.0))
        .unwrap();
    assert_eq!(average(&services, "SV01"), 8.0);

    services
        .scores
        .add(&Score::new("SV01", "MH03", 8.0))
        .unwrap();
    assert_eq!(average(&services, "SV01"), 8.0);

    services.scores.delete("SV01", "MH02").unwrap();
    assert_eq!(average(&services, "SV01"), 7.0);
}

#[test]
fn list_by_student_filters_in_insertion_order() {
    let services = setup();
    services
        .students
        .add(&Student::new(
            "SV02",
            "Binh",
            NaiveDate::from_ymd_opt(2004, 2, 29).unwrap(),
            "",
        ))
        .unwrap();
    services
        .subjects
        .add(&Subject::new("MH02", "Vat ly", 2))
        .unwrap();
    services
        .scores
        .add(&Score::new("SV01", "MH02", 5.0))
        .unwrap();
    services
        .scores
        .add(&Score::new("SV02", "MH01", 6.0))
        .unwrap();
    services
        .scores
        .add(&Score::new("SV01", "MH01", 7.0))
        .unwrap();

    let subjects: Vec<_> = services
        .scores
        .list_by_student("SV01")
        .unwrap()
        .into_iter()
        .map(|score| score.ma_mon)
        .collect();
    assert_eq!(subjects, vec!["MH02", "MH01"]);
    assert!(services.scores.list_by_student("SV404").unwrap().is_empty());
}

#[test]
fn end_to_end_scenario_keeps_derived_values_consistent() {
    let services = setup();

    services
        .scores
        .add(&Score::new("SV01", "MH01", 7.5))
        .unwrap();
    assert_eq!(average(&services, "SV01"), 7.5);
    assert_eq!(
        services
            .subjects
            .find_by_id("MH01")
            .unwrap()
            .unwrap()
            .so_luong_dang_ky,
        1
    );

    services.students.delete("SV01").unwrap();
    assert!(services.scores.get_all().unwrap().is_empty());
    assert_eq!(
        services
            .subjects
            .find_by_id("MH01")
            .unwrap()
            .unwrap()
            .so_luong_dang_ky,
        0
    );
}
