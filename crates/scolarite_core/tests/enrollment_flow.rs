use scolarite_core::db::open_db_in_memory;
use scolarite_core::{
    EnrollmentDraft, EnrollmentRepository, ProgramDraft, ProgramRepository, RepoError,
    SqliteEnrollmentRepository, SqliteProgramRepository, SqliteStudentRepository, StudentDraft,
    StudentRepository,
};

fn student_draft(registration_no: &str, last_name: &str, first_name: &str) -> StudentDraft {
    StudentDraft {
        registration_no: registration_no.to_string(),
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        email: None,
        phone: None,
    }
}

fn program_draft(name: &str) -> ProgramDraft {
    ProgramDraft {
        name: name.to_string(),
        year_count: 3,
        department_id: None,
    }
}

fn enrollment_draft(student_id: i64, program_id: i64) -> EnrollmentDraft {
    EnrollmentDraft {
        student_id,
        program_id,
        enrollment_year: 2024,
    }
}

#[test]
fn available_and_enrolled_partition_the_student_body() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let program = programs.create(&program_draft("Licence")).unwrap();
    let a = students
        .create(&student_draft("MAT-001", "Rakoto", "Hery"))
        .unwrap();
    let b = students
        .create(&student_draft("MAT-002", "Rabe", "Niry"))
        .unwrap();
    let c = students
        .create(&student_draft("MAT-003", "Randria", "Fara"))
        .unwrap();

    // Nobody enrolled yet: everyone is available.
    assert_eq!(enrollments.list_available_students(program).unwrap().len(), 3);
    assert!(enrollments.list_enrolled(program).unwrap().is_empty());

    enrollments.create(&enrollment_draft(a, program)).unwrap();
    enrollments.create(&enrollment_draft(c, program)).unwrap();

    let available = enrollments.list_available_students(program).unwrap();
    let enrolled = enrollments.list_enrolled(program).unwrap();

    let available_ids: Vec<_> = available.iter().map(|s| s.id).collect();
    let enrolled_ids: Vec<_> = enrolled.iter().map(|s| s.id).collect();
    assert_eq!(available_ids, vec![b]);
    assert_eq!(enrolled_ids, vec![a, c]);

    // The two views never overlap and together cover every student.
    assert_eq!(available.len() + enrolled.len(), students.list().unwrap().len());
    assert!(available_ids.iter().all(|id| !enrolled_ids.contains(id)));
}

#[test]
fn rosters_follow_student_listing_order() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let program = programs.create(&program_draft("Licence")).unwrap();
    let rakoto = students
        .create(&student_draft("MAT-001", "Rakoto", "Hery"))
        .unwrap();
    let rabe = students
        .create(&student_draft("MAT-002", "Rabe", "Niry"))
        .unwrap();

    enrollments.create(&enrollment_draft(rakoto, program)).unwrap();
    enrollments.create(&enrollment_draft(rabe, program)).unwrap();

    let enrolled = enrollments.list_enrolled(program).unwrap();
    let names: Vec<_> = enrolled.iter().map(|s| s.last_name.as_str()).collect();
    assert_eq!(names, vec!["Rabe", "Rakoto"]);
}

#[test]
fn enrolling_twice_in_same_program_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let program = programs.create(&program_draft("Licence")).unwrap();
    let student = students
        .create(&student_draft("MAT-001", "Rakoto", "Hery"))
        .unwrap();

    enrollments.create(&enrollment_draft(student, program)).unwrap();
    let err = enrollments
        .create(&enrollment_draft(student, program))
        .unwrap_err();

    match err {
        RepoError::DuplicateEnrollment {
            student_id,
            program_id,
        } => {
            assert_eq!(student_id, student);
            assert_eq!(program_id, program);
        }
        other => panic!("unexpected error: {other}"),
    }

    // A second program is still open to the same student.
    let master = programs.create(&program_draft("Master")).unwrap();
    enrollments.create(&enrollment_draft(student, master)).unwrap();
}

#[test]
fn moving_enrollment_onto_occupied_pair_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let licence = programs.create(&program_draft("Licence")).unwrap();
    let master = programs.create(&program_draft("Master")).unwrap();
    let student = students
        .create(&student_draft("MAT-001", "Rakoto", "Hery"))
        .unwrap();

    enrollments.create(&enrollment_draft(student, licence)).unwrap();
    let in_master = enrollments.create(&enrollment_draft(student, master)).unwrap();

    let err = enrollments
        .update(in_master, &enrollment_draft(student, licence))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEnrollment { .. }));

    // Updating a row onto its own pair is not a collision.
    let mut same = enrollment_draft(student, master);
    same.enrollment_year = 2025;
    enrollments.update(in_master, &same).unwrap();
    assert_eq!(
        enrollments.get(in_master).unwrap().unwrap().enrollment_year,
        2025
    );
}

#[test]
fn withdrawal_removes_the_pair_and_frees_the_student() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let program = programs.create(&program_draft("Licence")).unwrap();
    let student = students
        .create(&student_draft("MAT-001", "Rakoto", "Hery"))
        .unwrap();
    enrollments.create(&enrollment_draft(student, program)).unwrap();

    enrollments.delete_for_program(student, program).unwrap();

    assert!(enrollments.list_enrolled(program).unwrap().is_empty());
    assert_eq!(enrollments.list_available_students(program).unwrap().len(), 1);

    // Withdrawing again finds nothing to delete; the error names the
    // exact (student, program) pair.
    let err = enrollments.delete_for_program(student, program).unwrap_err();
    match err {
        RepoError::EnrollmentNotFound {
            student_id,
            program_id,
        } => {
            assert_eq!(student_id, student);
            assert_eq!(program_id, program);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn enrolling_unknown_student_is_a_foreign_key_failure() {
    let conn = open_db_in_memory().unwrap();
    let programs = SqliteProgramRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let program = programs.create(&program_draft("Licence")).unwrap();
    let err = enrollments
        .create(&enrollment_draft(9_999, program))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}
