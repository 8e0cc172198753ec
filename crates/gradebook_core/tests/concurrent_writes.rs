use chrono::NaiveDate;
use gradebook_core::{
    Score, ScoreService, ServiceError, Services, Store, Student, StudentService, Subject,
    SubjectService,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn student(msv: &str) -> Student {
    Student::new(msv, "Ten", NaiveDate::from_ymd_opt(2003, 9, 1).unwrap(), "")
}

#[test]
fn concurrent_add_of_same_key_has_exactly_one_winner() {
    let services = Services::local(Store::open_in_memory().unwrap());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let students = services.students.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                students.add(&student("SV01"))
            })
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| matches!(err, ServiceError::DuplicateKey(_))));
    assert_eq!(services.students.get_all().unwrap().len(), 1);
}

#[test]
fn cascade_delete_racing_score_adds_leaves_no_orphans() {
    let services = Services::local(Store::open_in_memory().unwrap());
    services.students.add(&student("SV01")).unwrap();
    for index in 0..20 {
        services
            .subjects
            .add(&Subject::new(format!("MH{index:02}"), "Mon", 2))
            .unwrap();
    }
    let barrier = Arc::new(Barrier::new(2));

    let scores = services.scores.clone();
    let adder_barrier = barrier.clone();
    let adder = thread::spawn(move || {
        adder_barrier.wait();
        (0..20)
            .map(|index| scores.add(&Score::new("SV01", format!("MH{index:02}"), 5.0)))
            .collect::<Vec<_>>()
    });

    let students = services.students.clone();
    let deleter = thread::spawn(move || {
        barrier.wait();
        students.delete("SV01")
    });

    let add_results = adder.join().unwrap();
    deleter.join().unwrap().unwrap();

    assert!(add_results.iter().all(|result| match result {
        Ok(_) => true,
        Err(err) => matches!(err, ServiceError::NotFound(_)),
    }));
    assert!(services.scores.get_all().unwrap().is_empty());
    assert_eq!(services.students.find_by_id("SV01").unwrap(), None);
}

#[test]
fn subject_cascade_racing_score_adds_leaves_no_orphans() {
    let services = Services::local(Store::open_in_memory().unwrap());
    services
        .subjects
        .add(&Subject::new("MH01", "Giai tich", 3))
        .unwrap();
    for index in 0..20 {
        services
            .students
            .add(&student(&format!("SV{index:02}")))
            .unwrap();
    }
    let barrier = Arc::new(Barrier::new(2));

    let scores = services.scores.clone();
    let adder_barrier = barrier.clone();
    let adder = thread::spawn(move || {
        adder_barrier.wait();
        (0..20)
            .map(|index| scores.add(&Score::new(format!("SV{index:02}"), "MH01", 6.0)))
            .collect::<Vec<_>>()
    });

    let subjects = services.subjects.clone();
    let deleter = thread::spawn(move || {
        barrier.wait();
        subjects.delete("MH01")
    });

    let add_results = adder.join().unwrap();
    deleter.join().unwrap().unwrap();

    assert!(add_results.iter().all(|result| match result {
        Ok(_) => true,
        Err(err) => matches!(err, ServiceError::NotFound(_)),
    }));
    assert!(services.scores.get_all().unwrap().is_empty());
    assert_eq!(services.subjects.find_by_id("MH01").unwrap(), None);
    assert!(services
        .students
        .get_all()
        .unwrap()
        .iter()
        .all(|student| student.diem_tb == 0.0));
}
