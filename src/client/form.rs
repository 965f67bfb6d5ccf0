use crate::{
    client::api::CreateStudentRequest,
    data::student::{MAX_AGE, MIN_AGE},
};
use snafu::{OptionExt, Snafu, ensure};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FormProblem {
    #[snafu(display("All required fields must be filled in"))]
    MissingRequired,
    #[snafu(display("Age must be a whole number"))]
    AgeNotANumber,
    #[snafu(display("Age must be between {} and {}", MIN_AGE, MAX_AGE))]
    AgeOutOfRange,
}

///Raw text of the new-student form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub major: String,
    pub subjects: String,
}

impl StudentForm {
    ///Checks are stricter than the server's so most mistakes never leave the client.
    pub fn validate(&self) -> Result<CreateStudentRequest, FormProblem> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let major = self.major.trim();

        ensure!(
            !first_name.is_empty() && !last_name.is_empty() && !major.is_empty(),
            MissingRequiredSnafu
        );

        let age = self
            .age
            .trim()
            .parse::<i64>()
            .ok()
            .context(AgeNotANumberSnafu)?;
        ensure!((MIN_AGE..=MAX_AGE).contains(&age), AgeOutOfRangeSnafu);

        Ok(CreateStudentRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            major: major.to_string(),
            subjects: self.subjects.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
