use snafu::Snafu;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    #[default]
    All,
    ByMajor,
    ByMinAge,
    Count,
}

impl QueryMode {
    pub const fn needs_filter(self) -> bool {
        matches!(self, Self::ByMajor | Self::ByMinAge)
    }

    ///hint shown in the filter input, only for modes that have one
    pub const fn placeholder(self) -> Option<&'static str> {
        match self {
            Self::ByMajor => Some("Major name"),
            Self::ByMinAge => Some("Minimum age"),
            Self::All | Self::Count => None,
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown query mode {:?}, expected one of all, major, age, count", original))]
pub struct UnknownMode {
    original: String,
}

impl FromStr for QueryMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "major" | "by-major" => Ok(Self::ByMajor),
            "age" | "by-min-age" => Ok(Self::ByMinAge),
            "count" => Ok(Self::Count),
            _ => UnknownModeSnafu { original: s }.fail(),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum QueryProblem {
    #[snafu(display("Enter a value for {}", field))]
    MissingFilter { field: &'static str },
    #[snafu(display("Age must be a valid number"))]
    InvalidAge,
}

///A query that passed validation and is ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedQuery {
    All,
    ByMajor(String),
    ByMinAge(u32),
    Count,
}

impl PreparedQuery {
    pub fn prepare(mode: QueryMode, filter: &str) -> Result<Self, QueryProblem> {
        let filter = filter.trim();

        match mode {
            QueryMode::All => Ok(Self::All),
            QueryMode::Count => Ok(Self::Count),
            QueryMode::ByMajor if filter.is_empty() => {
                MissingFilterSnafu { field: "major" }.fail()
            }
            QueryMode::ByMajor => Ok(Self::ByMajor(filter.to_string())),
            QueryMode::ByMinAge if filter.is_empty() => MissingFilterSnafu {
                field: "minimum age",
            }
            .fail(),
            QueryMode::ByMinAge => filter
                .parse()
                .map(Self::ByMinAge)
                .map_err(|_| QueryProblem::InvalidAge),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::All => "Fetch all students".to_string(),
            Self::ByMajor(major) => format!("Search students by major: {major}"),
            Self::ByMinAge(age) => format!("Search students with minimum age: {age}"),
            Self::Count => "Count all students".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_filtered_modes_have_placeholders() {
        assert_eq!(QueryMode::ByMajor.placeholder(), Some("Major name"));
        assert_eq!(QueryMode::ByMinAge.placeholder(), Some("Minimum age"));
        assert_eq!(QueryMode::All.placeholder(), None);
        assert!(!QueryMode::Count.needs_filter());
    }

    #[test]
    fn modes_parse_from_short_and_long_names() {
        assert_eq!("major".parse::<QueryMode>(), Ok(QueryMode::ByMajor));
        assert_eq!("BY-MIN-AGE".parse::<QueryMode>(), Ok(QueryMode::ByMinAge));
        assert!("everything".parse::<QueryMode>().is_err());
    }

    #[test]
    fn filters_are_validated_per_mode() {
        assert_eq!(
            PreparedQuery::prepare(QueryMode::ByMajor, "  "),
            Err(QueryProblem::MissingFilter { field: "major" })
        );
        assert_eq!(
            PreparedQuery::prepare(QueryMode::ByMinAge, "-3"),
            Err(QueryProblem::InvalidAge)
        );
        assert_eq!(
            PreparedQuery::prepare(QueryMode::ByMinAge, "abc"),
            Err(QueryProblem::InvalidAge)
        );
        assert_eq!(
            PreparedQuery::prepare(QueryMode::ByMinAge, " 20 "),
            Ok(PreparedQuery::ByMinAge(20))
        );
        assert_eq!(
            PreparedQuery::prepare(QueryMode::All, "ignored"),
            Ok(PreparedQuery::All)
        );
    }
}
