use crate::error::{
    AgeOutOfRangeSnafu, BlankFieldSnafu, MissingFieldsSnafu, ParseAgeSnafu, RosterResult,
};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use time::OffsetDateTime;
use uuid::Uuid;

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 65;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub major: String,
    pub subjects: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_at: Option<OffsetDateTime>,
}

///Validated fields for a new record, ready to hand to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub major: String,
    pub subjects: Vec<String>,
    pub created_at: OffsetDateTime,
}

///Merge-style update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub major: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub modified_at: OffsetDateTime,
}

impl StudentPatch {
    pub fn apply_to(self, student: &mut Student) {
        let Self {
            first_name,
            last_name,
            age,
            major,
            subjects,
            modified_at,
        } = self;

        if let Some(first_name) = first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            student.last_name = last_name;
        }
        if let Some(age) = age {
            student.age = age;
        }
        if let Some(major) = major {
            student.major = major;
        }
        if let Some(subjects) = subjects {
            student.subjects = subjects;
        }
        student.modified_at = Some(modified_at);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

impl AgeInput {
    ///`Ok(None)` for the falsy cases (zero, blank text)
    pub fn resolve(&self) -> RosterResult<Option<i64>> {
        match self {
            Self::Number(0) => Ok(None),
            Self::Number(n) => Ok(Some(*n)),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                let parsed = trimmed
                    .parse::<i64>()
                    .ok()
                    .context(ParseAgeSnafu { original: text })?;
                Ok((parsed != 0).then_some(parsed))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubjectsInput {
    List(Vec<String>),
    Text(String),
}

impl SubjectsInput {
    pub fn normalise(self) -> Vec<String> {
        match self {
            Self::List(list) => clean_subjects(list.iter().map(String::as_str)),
            Self::Text(text) => clean_subjects(text.split(',')),
        }
    }
}

fn clean_subjects<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(ToString::to_string)
        .collect()
}

///What the API accepts for both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<AgeInput>,
    pub major: Option<String>,
    pub subjects: Option<SubjectsInput>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn checked_age(age: i64) -> RosterResult<i32> {
    i32::try_from(age)
        .ok()
        .filter(|_| (MIN_AGE..=MAX_AGE).contains(&age))
        .context(AgeOutOfRangeSnafu {
            age,
            min: MIN_AGE,
            max: MAX_AGE,
        })
}

impl StudentPayload {
    pub fn into_new_student(self, created_at: OffsetDateTime) -> RosterResult<NewStudent> {
        let Self {
            first_name,
            last_name,
            age,
            major,
            subjects,
        } = self;

        let age = match age {
            Some(age) => age.resolve()?,
            None => None,
        };

        let (Some(first_name), Some(last_name), Some(age), Some(major)) = (
            non_blank(first_name),
            non_blank(last_name),
            age,
            non_blank(major),
        ) else {
            return MissingFieldsSnafu.fail();
        };

        Ok(NewStudent {
            first_name,
            last_name,
            age: checked_age(age)?,
            major,
            subjects: subjects.map(SubjectsInput::normalise).unwrap_or_default(),
            created_at,
        })
    }

    pub fn into_patch(self, modified_at: OffsetDateTime) -> RosterResult<StudentPatch> {
        let Self {
            first_name,
            last_name,
            age,
            major,
            subjects,
        } = self;

        let present_non_blank = |value: Option<String>, field: &'static str| match value {
            None => Ok(None),
            Some(value) => non_blank(Some(value))
                .context(BlankFieldSnafu { field })
                .map(Some),
        };

        let age = match age {
            None => None,
            Some(age) => {
                let resolved = age.resolve()?.context(BlankFieldSnafu { field: "age" })?;
                Some(checked_age(resolved)?)
            }
        };

        Ok(StudentPatch {
            first_name: present_non_blank(first_name, "firstName")?,
            last_name: present_non_blank(last_name, "lastName")?,
            age,
            major: present_non_blank(major, "major")?,
            subjects: subjects.map(SubjectsInput::normalise),
            modified_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use serde_json::json;
    use time::macros::datetime;

    fn payload(value: serde_json::Value) -> StudentPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn comma_separated_subjects_are_split_and_trimmed() {
        let subjects = SubjectsInput::Text(" Math, Physics ,, ,Chemistry".into()).normalise();
        assert_eq!(subjects, ["Math", "Physics", "Chemistry"]);
    }

    #[test]
    fn subject_lists_lose_blank_entries() {
        let subjects =
            SubjectsInput::List(vec!["  Art ".into(), String::new(), "   ".into()]).normalise();
        assert_eq!(subjects, ["Art"]);
    }

    #[test]
    fn create_payload_is_trimmed_and_stamped() {
        let created_at = datetime!(2025-03-01 10:00 UTC);
        let new = payload(json!({
            "firstName": " Ana ",
            "lastName": "Diaz",
            "age": "21",
            "major": " CS ",
            "subjects": "Math, Physics",
        }))
        .into_new_student(created_at)
        .unwrap();

        assert_eq!(new.first_name, "Ana");
        assert_eq!(new.major, "CS");
        assert_eq!(new.age, 21);
        assert_eq!(new.subjects, ["Math", "Physics"]);
        assert_eq!(new.created_at, created_at);
    }

    #[test]
    fn falsy_required_fields_are_missing() {
        let now = datetime!(2025-03-01 10:00 UTC);
        for body in [
            json!({"lastName": "Diaz", "age": 21, "major": "CS"}),
            json!({"firstName": "  ", "lastName": "Diaz", "age": 21, "major": "CS"}),
            json!({"firstName": "Ana", "lastName": "Diaz", "age": 0, "major": "CS"}),
            json!({"firstName": "Ana", "lastName": "Diaz", "age": "", "major": "CS"}),
            json!({"firstName": "Ana", "lastName": "Diaz", "age": 21}),
        ] {
            let err = payload(body).into_new_student(now).unwrap_err();
            assert!(matches!(err, RosterError::MissingFields), "{err:?}");
        }
    }

    #[test]
    fn ages_outside_the_range_are_rejected() {
        let now = datetime!(2025-03-01 10:00 UTC);
        let err = payload(json!({"firstName": "A", "lastName": "B", "age": 17, "major": "C"}))
            .into_new_student(now)
            .unwrap_err();
        assert!(matches!(err, RosterError::AgeOutOfRange { age: 17, .. }));

        let err = payload(json!({"firstName": "A", "lastName": "B", "age": "abc", "major": "C"}))
            .into_new_student(now)
            .unwrap_err();
        assert!(matches!(err, RosterError::ParseAge { .. }));
    }

    #[test]
    fn age_bounds_are_inclusive_and_never_wrap() {
        assert_eq!(checked_age(MIN_AGE).unwrap(), 18);
        assert_eq!(checked_age(MAX_AGE).unwrap(), 65);
        assert!(matches!(checked_age(66), Err(RosterError::AgeOutOfRange { age: 66, .. })));
        //would wrap to 18 if narrowed before the range check
        let wraps_to_min = (1_i64 << 32) + 18;
        assert!(matches!(
            checked_age(wraps_to_min),
            Err(RosterError::AgeOutOfRange { .. })
        ));
        assert!(checked_age(i64::MIN).is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut student = Student {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Diaz".into(),
            age: 21,
            major: "CS".into(),
            subjects: vec!["Math".into()],
            created_at: datetime!(2025-03-01 10:00 UTC),
            modified_at: None,
        };
        let modified_at = datetime!(2025-03-02 09:30 UTC);

        payload(json!({"major": "Physics", "subjects": ["Optics", ""]}))
            .into_patch(modified_at)
            .unwrap()
            .apply_to(&mut student);

        assert_eq!(student.first_name, "Ana");
        assert_eq!(student.age, 21);
        assert_eq!(student.major, "Physics");
        assert_eq!(student.subjects, ["Optics"]);
        assert_eq!(student.modified_at, Some(modified_at));
    }

    #[test]
    fn patch_rejects_blank_values() {
        let now = datetime!(2025-03-01 10:00 UTC);
        let err = payload(json!({"lastName": " "})).into_patch(now).unwrap_err();
        assert!(matches!(err, RosterError::BlankField { field: "lastName" }));

        let err = payload(json!({"age": 99})).into_patch(now).unwrap_err();
        assert!(matches!(err, RosterError::AgeOutOfRange { .. }));
    }

    #[test]
    fn modified_at_is_omitted_until_set() {
        let student = Student {
            id: Uuid::nil(),
            first_name: "Ana".into(),
            last_name: "Diaz".into(),
            age: 21,
            major: "CS".into(),
            subjects: vec![],
            created_at: datetime!(2025-03-01 10:00 UTC),
            modified_at: None,
        };
        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["createdAt"], "2025-03-01T10:00:00Z");
        assert!(value.get("modifiedAt").is_none());
    }
}
