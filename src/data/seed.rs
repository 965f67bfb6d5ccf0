use crate::{
    data::{StudentStore, student::NewStudent},
    error::RosterResult,
};
use time::OffsetDateTime;

const SAMPLE_STUDENTS: &[(&str, &str, i32, &str, &[&str])] = &[
    (
        "Lucia",
        "Fernandez",
        22,
        "Computer Science",
        &["Algorithms", "Databases", "Operating Systems"],
    ),
    (
        "Martin",
        "Gomez",
        25,
        "Electrical Engineering",
        &["Circuits", "Signals"],
    ),
    (
        "Sofia",
        "Herrera",
        19,
        "Information Systems",
        &["Programming", "Discrete Maths"],
    ),
    ("Diego", "Ruiz", 31, "Civil Engineering", &["Structures"]),
];

///Fills an empty store with a handful of students. Returns how many were added.
pub async fn seed_if_empty(store: &dyn StudentStore) -> RosterResult<usize> {
    if store.count().await? > 0 {
        debug!("Store already has students, not seeding");
        return Ok(0);
    }

    let now = OffsetDateTime::now_utc();
    for (first_name, last_name, age, major, subjects) in SAMPLE_STUDENTS {
        store
            .insert(NewStudent {
                first_name: (*first_name).to_string(),
                last_name: (*last_name).to_string(),
                age: *age,
                major: (*major).to_string(),
                subjects: subjects.iter().map(ToString::to_string).collect(),
                created_at: now,
            })
            .await?;
    }

    info!(count = SAMPLE_STUDENTS.len(), "Seeded sample students");
    Ok(SAMPLE_STUDENTS.len())
}
