use crate::{
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentPatch},
    },
    error::RosterResult,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

///Keeps students in insertion order, for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    students: RwLock<Vec<Student>>,
}

impl MemoryStore {
    async fn find_where(&self, pred: impl Fn(&Student) -> bool) -> Vec<Student> {
        self.students
            .read()
            .await
            .iter()
            .filter(|student| pred(student))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn find_all(&self) -> RosterResult<Vec<Student>> {
        Ok(self.students.read().await.clone())
    }

    async fn find_by_major(&self, fragment: &str) -> RosterResult<Vec<Student>> {
        let fragment = fragment.to_lowercase();
        Ok(self
            .find_where(|student| student.major.to_lowercase().contains(&fragment))
            .await)
    }

    async fn find_by_min_age(&self, min_age: i64) -> RosterResult<Vec<Student>> {
        Ok(self
            .find_where(|student| i64::from(student.age) >= min_age)
            .await)
    }

    async fn count(&self) -> RosterResult<u64> {
        Ok(self.students.read().await.len() as u64)
    }

    async fn insert(&self, to_be_added: NewStudent) -> RosterResult<Student> {
        let NewStudent {
            first_name,
            last_name,
            age,
            major,
            subjects,
            created_at,
        } = to_be_added;

        let student = Student {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            age,
            major,
            subjects,
            created_at,
            modified_at: None,
        };
        self.students.write().await.push(student.clone());
        Ok(student)
    }

    async fn update(&self, id: Uuid, patch: StudentPatch) -> RosterResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(student) = students.iter_mut().find(|student| student.id == id) else {
            return Ok(None);
        };
        patch.apply_to(student);
        Ok(Some(student.clone()))
    }

    async fn remove(&self, id: Uuid) -> RosterResult<bool> {
        let mut students = self.students.write().await;
        let before = students.len();
        students.retain(|student| student.id != id);
        Ok(students.len() != before)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_student(first_name: &str, age: i32, major: &str) -> NewStudent {
        NewStudent {
            first_name: first_name.into(),
            last_name: "Tester".into(),
            age,
            major: major.into(),
            subjects: vec![],
            created_at: datetime!(2025-03-01 10:00 UTC),
        }
    }

    #[tokio::test]
    async fn inserts_get_distinct_ids_and_keep_order() {
        let store = MemoryStore::default();
        let first = store.insert(new_student("Ana", 21, "CS")).await.unwrap();
        let second = store.insert(new_student("Bo", 30, "Law")).await.unwrap();

        assert_ne!(first.id, second.id);
        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn major_search_ignores_case() {
        let store = MemoryStore::default();
        store
            .insert(new_student("Ana", 21, "Computer Science"))
            .await
            .unwrap();
        store.insert(new_student("Bo", 30, "Law")).await.unwrap();

        let found = store.find_by_major("SCIENCE").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Ana");
        assert!(store.find_by_major("biology").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn major_search_is_literal() {
        let store = MemoryStore::default();
        for major in ["100% Online", "1000 Online", "Data_Science", "DataXScience"] {
            store.insert(new_student("Ana", 21, major)).await.unwrap();
        }

        let percent = store.find_by_major("0%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].major, "100% Online");
        assert_eq!(store.find_by_major("A_S").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn min_age_is_inclusive() {
        let store = MemoryStore::default();
        store.insert(new_student("Ana", 21, "CS")).await.unwrap();
        store.insert(new_student("Bo", 30, "Law")).await.unwrap();

        assert_eq!(store.find_by_min_age(21).await.unwrap().len(), 2);
        assert_eq!(store.find_by_min_age(22).await.unwrap().len(), 1);
        assert!(store.find_by_min_age(31).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_ids() {
        let store = MemoryStore::default();
        let ana = store.insert(new_student("Ana", 21, "CS")).await.unwrap();

        let patch = StudentPatch {
            first_name: None,
            last_name: None,
            age: Some(22),
            major: None,
            subjects: None,
            modified_at: datetime!(2025-03-02 10:00 UTC),
        };
        assert!(
            store
                .update(Uuid::new_v4(), patch.clone())
                .await
                .unwrap()
                .is_none()
        );

        let updated = store.update(ana.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.age, 22);
        assert_eq!(updated.major, "CS");
        assert!(updated.modified_at.is_some());

        assert!(store.remove(ana.id).await.unwrap());
        assert!(!store.remove(ana.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
