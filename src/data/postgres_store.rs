use crate::{
    config::DbConfig,
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentPatch},
    },
    error::{InvalidCountSnafu, MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
};
use async_trait::async_trait;
use futures::TryStreamExt;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use uuid::Uuid;

const SELECT_STUDENTS: &str = "SELECT id, first_name, last_name, age, major, subjects, created_at, modified_at FROM public.students";
const RETURNING_STUDENT: &str =
    "RETURNING id, first_name, last_name, age, major, subjects, created_at, modified_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    pub async fn connect(options: PgPoolOptions, db_config: &DbConfig) -> RosterResult<Self> {
        let pool = options
            .connect(&db_config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self::from_pool(pool))
    }

    ///the pool's database must already be migrated
    pub const fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_students(
        &self,
        query: sqlx::query::QueryAs<'_, Postgres, Student, sqlx::postgres::PgArguments>,
    ) -> RosterResult<Vec<Student>> {
        query
            .fetch(&self.pool)
            .try_collect()
            .await
            .context(MakeQuerySnafu)
    }
}

#[async_trait]
impl StudentStore for PostgresStore {
    async fn find_all(&self) -> RosterResult<Vec<Student>> {
        let sql = format!("{SELECT_STUDENTS} ORDER BY inserted_seq");
        self.fetch_students(sqlx::query_as(&sql)).await
    }

    async fn find_by_major(&self, fragment: &str) -> RosterResult<Vec<Student>> {
        //strpos rather than LIKE so `%` and `_` in the fragment are literal
        let sql = format!(
            "{SELECT_STUDENTS} WHERE strpos(lower(major), lower($1)) > 0 ORDER BY inserted_seq"
        );
        self.fetch_students(sqlx::query_as(&sql).bind(fragment))
            .await
    }

    async fn find_by_min_age(&self, min_age: i64) -> RosterResult<Vec<Student>> {
        let sql = format!("{SELECT_STUDENTS} WHERE age >= $1 ORDER BY inserted_seq");
        self.fetch_students(sqlx::query_as(&sql).bind(min_age)).await
    }

    async fn count(&self) -> RosterResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.students")
            .fetch_one(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        u64::try_from(count).context(InvalidCountSnafu)
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

        let sql = format!(
            "INSERT INTO public.students (id, first_name, last_name, age, major, subjects, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) {RETURNING_STUDENT}"
        );
        sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(first_name)
            .bind(last_name)
            .bind(age)
            .bind(major)
            .bind(subjects)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn update(&self, id: Uuid, patch: StudentPatch) -> RosterResult<Option<Student>> {
        let StudentPatch {
            first_name,
            last_name,
            age,
            major,
            subjects,
            modified_at,
        } = patch;

        let sql = format!(
            "UPDATE public.students SET first_name = COALESCE($2, first_name), last_name = COALESCE($3, last_name), age = COALESCE($4, age), major = COALESCE($5, major), subjects = COALESCE($6, subjects), modified_at = $7 WHERE id = $1 {RETURNING_STUDENT}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(age)
            .bind(major)
            .bind(subjects)
            .bind(modified_at)
            .fetch_optional(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn remove(&self, id: Uuid) -> RosterResult<bool> {
        let result = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use time::macros::datetime;

    fn new_student(first_name: &str, age: i32, major: &str) -> NewStudent {
        NewStudent {
            first_name: first_name.into(),
            last_name: "Tester".into(),
            age,
            major: major.into(),
            subjects: vec!["Math".into()],
            created_at: datetime!(2025-03-01 10:00 UTC),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a postgres server in DATABASE_URL"]
    async fn rows_with_equal_timestamps_keep_insertion_order(pool: PgPool) {
        let store = PostgresStore::from_pool(pool);
        let mut inserted = vec![];
        for name in ["Cy", "Ana", "Bo"] {
            inserted.push(store.insert(new_student(name, 21, "CS")).await.unwrap());
        }

        assert_eq!(store.find_all().await.unwrap(), inserted);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[sqlx::test]
    #[ignore = "needs a postgres server in DATABASE_URL"]
    async fn major_search_is_literal_and_ignores_case(pool: PgPool) {
        let store = PostgresStore::from_pool(pool);
        for major in ["100% Online", "1000 Online", "Data_Science", "DataXScience"] {
            store.insert(new_student("Ana", 21, major)).await.unwrap();
        }

        let percent = store.find_by_major("0%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].major, "100% Online");

        let underscore = store.find_by_major("A_S").await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].major, "Data_Science");

        assert_eq!(store.find_by_major("ONLINE").await.unwrap().len(), 2);
        assert!(store.find_by_major("law").await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs a postgres server in DATABASE_URL"]
    async fn min_age_is_inclusive(pool: PgPool) {
        let store = PostgresStore::from_pool(pool);
        store.insert(new_student("Ana", 21, "CS")).await.unwrap();
        store.insert(new_student("Bo", 30, "Law")).await.unwrap();

        assert_eq!(store.find_by_min_age(21).await.unwrap().len(), 2);
        assert_eq!(store.find_by_min_age(22).await.unwrap().len(), 1);
        assert!(store.find_by_min_age(31).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs a postgres server in DATABASE_URL"]
    async fn updates_merge_only_submitted_fields(pool: PgPool) {
        let store = PostgresStore::from_pool(pool);
        let ana = store.insert(new_student("Ana", 21, "CS")).await.unwrap();
        let modified_at = datetime!(2025-03-02 09:30 UTC);
        let patch = StudentPatch {
            first_name: None,
            last_name: None,
            age: Some(22),
            major: None,
            subjects: Some(vec!["Optics".into()]),
            modified_at,
        };

        assert!(
            store
                .update(Uuid::new_v4(), patch.clone())
                .await
                .unwrap()
                .is_none()
        );

        let updated = store.update(ana.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.id, ana.id);
        assert_eq!(updated.first_name, "Ana");
        assert_eq!(updated.major, "CS");
        assert_eq!(updated.age, 22);
        assert_eq!(updated.subjects, ["Optics"]);
        assert_eq!(updated.created_at, ana.created_at);
        assert_eq!(updated.modified_at, Some(modified_at));
        assert_eq!(store.find_all().await.unwrap(), vec![updated]);
    }

    #[sqlx::test]
    #[ignore = "needs a postgres server in DATABASE_URL"]
    async fn deleting_twice_reports_nothing_removed(pool: PgPool) {
        let store = PostgresStore::from_pool(pool);
        let ana = store.insert(new_student("Ana", 21, "CS")).await.unwrap();

        assert!(store.remove(ana.id).await.unwrap());
        assert!(!store.remove(ana.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
