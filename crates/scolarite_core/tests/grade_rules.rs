use scolarite_core::db::open_db_in_memory;
use scolarite_core::{
    GradeRepository, ProgramDraft, ProgramRepository, RepoError, SqliteGradeRepository,
    SqliteProgramRepository, SqliteStudentRepository, SqliteSubjectRepository, StudentDraft,
    StudentRepository, SubjectDraft, SubjectRepository, Term,
};

struct Fixture {
    student: i64,
    algo: i64,
    compilation: i64,
}

fn seed(conn: &rusqlite::Connection) -> Fixture {
    let students = SqliteStudentRepository::try_new(conn).unwrap();
    let programs = SqliteProgramRepository::try_new(conn).unwrap();
    let subjects = SqliteSubjectRepository::try_new(conn).unwrap();

    let program = programs
        .create(&ProgramDraft {
            name: "Licence".to_string(),
            year_count: 3,
            department_id: None,
        })
        .unwrap();
    let student = students
        .create(&StudentDraft {
            registration_no: "MAT-001".to_string(),
            last_name: "Rakoto".to_string(),
            first_name: "Hery".to_string(),
            email: None,
            phone: None,
        })
        .unwrap();

    let algo = subjects
        .create(&SubjectDraft {
            name: "Algorithmique".to_string(),
            credits: 4,
            program_id: program,
            year: 1,
            term: Term::First,
        })
        .unwrap();
    let compilation = subjects
        .create(&SubjectDraft {
            name: "Compilation".to_string(),
            credits: 3,
            program_id: program,
            year: 1,
            term: Term::Second,
        })
        .unwrap();

    Fixture {
        student,
        algo,
        compilation,
    }
}

#[test]
fn add_derives_term_from_the_subject() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let id = grades.add(fx.student, fx.compilation, 14.5).unwrap();
    let stored = grades.get(id).unwrap().unwrap();

    assert_eq!(stored.term, Term::Second);
    assert_eq!(stored.score, 14.5);
    assert_eq!(stored.subject_id, fx.compilation);
}

#[test]
fn second_grade_for_same_subject_and_term_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let id = grades.add(fx.student, fx.algo, 12.0).unwrap();
    let err = grades.add(fx.student, fx.algo, 18.0).unwrap_err();

    match err {
        RepoError::DuplicateGrade {
            student_id,
            subject_id,
            term,
        } => {
            assert_eq!(student_id, fx.student);
            assert_eq!(subject_id, fx.algo);
            assert_eq!(term, Term::First);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The first score stays on record.
    assert_eq!(grades.get(id).unwrap().unwrap().score, 12.0);
}

#[test]
fn grading_unknown_subject_reports_the_subject() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let err = grades.add(fx.student, 9_999, 10.0).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "subject",
            id: 9_999
        }
    ));
}

#[test]
fn scores_outside_the_twenty_point_scale_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    for bad in [-0.5, 20.5, f64::NAN] {
        let err = grades.add(fx.student, fx.algo, bad).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)), "score {bad}");
    }

    // Both scale endpoints are valid scores.
    grades.add(fx.student, fx.algo, 0.0).unwrap();
    grades.add(fx.student, fx.compilation, 20.0).unwrap();
}

#[test]
fn update_rewrites_score_by_durable_triple() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();

    let id = grades.add(fx.student, fx.algo, 8.0).unwrap();

    // Renaming the subject does not detach the grade from its key.
    let mut renamed = subjects.get(fx.algo).unwrap().unwrap();
    renamed.name = "Algorithmique avancée".to_string();
    subjects
        .update(
            fx.algo,
            &SubjectDraft {
                name: renamed.name,
                credits: renamed.credits,
                program_id: renamed.program_id,
                year: renamed.year,
                term: renamed.term,
            },
        )
        .unwrap();

    grades
        .update(fx.student, fx.algo, Term::First, 11.5, Term::First)
        .unwrap();
    assert_eq!(grades.get(id).unwrap().unwrap().score, 11.5);

    let err = grades
        .update(fx.student, fx.algo, Term::Second, 11.5, Term::Second)
        .unwrap_err();
    match err {
        RepoError::GradeNotFound {
            student_id,
            subject_id,
            term,
        } => {
            assert_eq!(student_id, fx.student);
            assert_eq!(subject_id, fx.algo);
            assert_eq!(term, Term::Second);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn moving_a_grade_onto_an_occupied_term_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    grades.add(fx.student, fx.algo, 12.0).unwrap();
    grades
        .update(fx.student, fx.algo, Term::First, 12.0, Term::Second)
        .unwrap();
    // The first-term slot is free again, so a fresh grade lands there.
    grades.add(fx.student, fx.algo, 15.0).unwrap();

    let err = grades
        .update(fx.student, fx.algo, Term::First, 15.0, Term::Second)
        .unwrap_err();
    match err {
        RepoError::DuplicateGrade { term, .. } => assert_eq!(term, Term::Second),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn delete_by_triple_and_by_id_both_report_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();

    let id = grades.add(fx.student, fx.algo, 12.0).unwrap();
    grades.delete(fx.student, fx.algo, Term::First).unwrap();
    assert!(grades.get(id).unwrap().is_none());

    // The triple-keyed path reports the full triple, never a row id that
    // would be mistaken for something else.
    let err = grades.delete(fx.student, fx.algo, Term::First).unwrap_err();
    match err {
        RepoError::GradeNotFound {
            student_id,
            subject_id,
            term,
        } => {
            assert_eq!(student_id, fx.student);
            assert_eq!(subject_id, fx.algo);
            assert_eq!(term, Term::First);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = grades.delete_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "grade", id: missing } if missing == id));
}

#[test]
fn graded_subjects_and_students_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = grades.add(fx.student, fx.algo, 12.0).unwrap();

    let err = subjects.delete(fx.algo).unwrap_err();
    assert!(matches!(
        err,
        RepoError::HasDependents {
            entity: "subject",
            ..
        }
    ));
    let err = students.delete(fx.student).unwrap_err();
    assert!(matches!(
        err,
        RepoError::HasDependents {
            entity: "student",
            ..
        }
    ));

    // Clearing the grade unblocks both deletions.
    grades.delete_by_id(id).unwrap();
    subjects.delete(fx.algo).unwrap();
    students.delete(fx.student).unwrap();
}

#[test]
fn grid_and_transcript_orderings_differ_on_term_and_name() {
    let conn = open_db_in_memory().unwrap();
    let fx = seed(&conn);
    let grades = SqliteGradeRepository::try_new(&conn).unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();

    // A first-term subject whose name sorts after the second-term ones.
    let reseaux = subjects
        .create(&SubjectDraft {
            name: "Réseaux".to_string(),
            credits: 2,
            program_id: subjects.get(fx.algo).unwrap().unwrap().program_id,
            year: 1,
            term: Term::First,
        })
        .unwrap();

    grades.add(fx.student, fx.compilation, 14.0).unwrap();
    grades.add(fx.student, fx.algo, 12.0).unwrap();
    grades.add(fx.student, reseaux, 16.0).unwrap();

    // Grid: year, subject name, term.
    let grid = grades.list_for_student(fx.student).unwrap();
    let grid_names: Vec<_> = grid.iter().map(|l| l.subject_name.as_str()).collect();
    assert_eq!(grid_names, vec!["Algorithmique", "Compilation", "Réseaux"]);

    // Transcript: year, term, subject name. All first-term rows come
    // before any second-term row, whatever the names.
    let lines = grades.transcript_lines(fx.student).unwrap();
    let line_names: Vec<_> = lines.iter().map(|l| l.subject_name.as_str()).collect();
    assert_eq!(line_names, vec!["Algorithmique", "Réseaux", "Compilation"]);
    assert_eq!(lines[0].term, Term::First);
    assert_eq!(lines[1].term, Term::First);
    assert_eq!(lines[2].term, Term::Second);
    assert_eq!(lines[1].credits, 2);
}
